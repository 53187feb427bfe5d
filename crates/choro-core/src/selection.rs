//! Active metric selection.
//!
//! The gradient radios and the month scrubber drive a single selection.
//! Picking a weather metric by key and scrubbing to its month land in the
//! same state, so there is exactly one representation per metric.

use serde::{Deserialize, Serialize};

use crate::catalog::{Metric, MetricKey, MONTH_NAMES, WEATHER_METRICS};
use crate::gradient::GradientFamily;
use crate::source::TableSource;

/// Calendar month, 0 = January.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthIndex(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("month index {0} is outside 0..=11")]
pub struct InvalidMonth(pub usize);

impl MonthIndex {
    pub const JANUARY: MonthIndex = MonthIndex(0);
    pub const DECEMBER: MonthIndex = MonthIndex(11);

    pub fn new(index: usize) -> Result<Self, InvalidMonth> {
        if index < 12 { Ok(Self(index as u8)) } else { Err(InvalidMonth(index)) }
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        MONTH_NAMES[self.get()]
    }

    /// Three-letter scrubber tick label.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }

    pub fn metric_key(self) -> MetricKey {
        WEATHER_METRICS[self.get()]
    }
}

impl TryFrom<u8> for MonthIndex {
    type Error = InvalidMonth;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as usize)
    }
}

impl From<MonthIndex> for u8 {
    fn from(m: MonthIndex) -> u8 {
        m.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ActiveSelection {
    /// No metric: value-based colouring is off.
    None,
    Weather(MonthIndex),
    Named(MetricKey),
}

impl Default for ActiveSelection {
    fn default() -> Self {
        Self::initial()
    }
}

impl ActiveSelection {
    /// January feels-like temperature.
    pub const fn initial() -> Self {
        Self::Weather(MonthIndex::JANUARY)
    }

    /// Selection for a metric key. Weather keys normalise to their month.
    pub fn for_key(key: MetricKey) -> Self {
        match key.month_index() {
            Some(m) => Self::Weather(MonthIndex(m as u8)),
            None => Self::Named(key),
        }
    }

    /// Gradient radio: checking selects `key`, unchecking clears the selection.
    pub fn toggle(key: MetricKey, checked: bool) -> Self {
        if checked { Self::for_key(key) } else { Self::None }
    }

    pub fn metric_key(self) -> Option<MetricKey> {
        match self {
            Self::None => None,
            Self::Weather(month) => Some(month.metric_key()),
            Self::Named(key) => Some(key),
        }
    }

    pub fn metric(self) -> Option<&'static Metric> {
        self.metric_key().map(MetricKey::metric)
    }

    pub fn month(self) -> Option<MonthIndex> {
        match self {
            Self::Weather(month) => Some(month),
            _ => None,
        }
    }

    pub fn table_source(self) -> Option<TableSource> {
        self.metric_key().map(MetricKey::table_source)
    }

    pub fn gradient(self) -> Option<GradientFamily> {
        self.metric_key().map(MetricKey::gradient)
    }

    pub fn is_reversed(self) -> bool {
        self.metric_key().is_some_and(MetricKey::is_reversed)
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}
