//! Static metric catalog.
//!
//! Every metric the map can colour by is a variant of [`MetricKey`]. Each key
//! resolves to a [`Metric`] describing the table column it reads and the
//! value range its gradient spans. Two derived classifications drive the
//! rest of the engine:
//!   - weather metrics (one per calendar month, scrubbed by month index)
//!   - reversed metrics (higher values map to the low end of the gradient)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gradient::GradientFamily;
use crate::source::TableSource;

/// Lower bound shared by all monthly feels-like temperature metrics (°C).
pub const WEATHER_MIN: f64 = -10.0;
/// Upper bound shared by all monthly feels-like temperature metrics (°C).
pub const WEATHER_MAX: f64 = 45.0;

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// A named, ranged numeric indicator bound to a table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    /// Zero-based cell index within a data row. Column 0 is the region name.
    pub column: usize,
    pub min: f64,
    pub max: f64,
}

impl Metric {
    const fn new(name: &'static str, column: usize, min: f64, max: f64) -> Self {
        Self { name, column, min, max }
    }

    /// Width of the declared value range. Always positive.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKey {
    PotableWater,
    DemocracyIndex,
    Smartraveller,
    CostOfLiving,
    Hdi,
    Crime,
    Corruption,
    JanFeels,
    FebFeels,
    MarFeels,
    AprFeels,
    MayFeels,
    JunFeels,
    JulFeels,
    AugFeels,
    SepFeels,
    OctFeels,
    NovFeels,
    DecFeels,
}

/// Weather metrics in calendar order; index = month index.
pub const WEATHER_METRICS: [MetricKey; 12] = [
    MetricKey::JanFeels,
    MetricKey::FebFeels,
    MetricKey::MarFeels,
    MetricKey::AprFeels,
    MetricKey::MayFeels,
    MetricKey::JunFeels,
    MetricKey::JulFeels,
    MetricKey::AugFeels,
    MetricKey::SepFeels,
    MetricKey::OctFeels,
    MetricKey::NovFeels,
    MetricKey::DecFeels,
];

pub const REVERSED_METRICS: [MetricKey; 2] = [MetricKey::Hdi, MetricKey::Corruption];

const POTABLE_WATER: Metric = Metric::new("Potable water", 1, 0.0, 100.0);
const DEMOCRACY_INDEX: Metric = Metric::new("Democracy index", 2, 0.0, 100.0);
const SMARTRAVELLER: Metric = Metric::new("Smartraveller safety", 3, 0.0, 5.0);
const COST_OF_LIVING: Metric = Metric::new("Cost of living", 4, 10.0, 100.0);
const HDI: Metric = Metric::new("Human Development Index", 5, 0.2, 1.0);
const CRIME: Metric = Metric::new("Crime index", 6, 20.0, 100.0);
const CORRUPTION: Metric = Metric::new("Corruption index", 7, -10.0, 80.0);

const FEELS_LIKE: [Metric; 12] = [
    Metric::new("January feels-like temperature", 26, WEATHER_MIN, WEATHER_MAX),
    Metric::new("February feels-like temperature", 27, WEATHER_MIN, WEATHER_MAX),
    Metric::new("March feels-like temperature", 28, WEATHER_MIN, WEATHER_MAX),
    Metric::new("April feels-like temperature", 29, WEATHER_MIN, WEATHER_MAX),
    Metric::new("May feels-like temperature", 30, WEATHER_MIN, WEATHER_MAX),
    Metric::new("June feels-like temperature", 31, WEATHER_MIN, WEATHER_MAX),
    Metric::new("July feels-like temperature", 32, WEATHER_MIN, WEATHER_MAX),
    Metric::new("August feels-like temperature", 33, WEATHER_MIN, WEATHER_MAX),
    Metric::new("September feels-like temperature", 34, WEATHER_MIN, WEATHER_MAX),
    Metric::new("October feels-like temperature", 35, WEATHER_MIN, WEATHER_MAX),
    Metric::new("November feels-like temperature", 36, WEATHER_MIN, WEATHER_MAX),
    Metric::new("December feels-like temperature", 37, WEATHER_MIN, WEATHER_MAX),
];

impl MetricKey {
    pub const ALL: [MetricKey; 19] = [
        MetricKey::PotableWater,
        MetricKey::DemocracyIndex,
        MetricKey::Smartraveller,
        MetricKey::CostOfLiving,
        MetricKey::Hdi,
        MetricKey::Crime,
        MetricKey::Corruption,
        MetricKey::JanFeels,
        MetricKey::FebFeels,
        MetricKey::MarFeels,
        MetricKey::AprFeels,
        MetricKey::MayFeels,
        MetricKey::JunFeels,
        MetricKey::JulFeels,
        MetricKey::AugFeels,
        MetricKey::SepFeels,
        MetricKey::OctFeels,
        MetricKey::NovFeels,
        MetricKey::DecFeels,
    ];

    /// Catalog lookup. Infallible: every key has exactly one metric.
    pub fn metric(self) -> &'static Metric {
        match self {
            MetricKey::PotableWater => &POTABLE_WATER,
            MetricKey::DemocracyIndex => &DEMOCRACY_INDEX,
            MetricKey::Smartraveller => &SMARTRAVELLER,
            MetricKey::CostOfLiving => &COST_OF_LIVING,
            MetricKey::Hdi => &HDI,
            MetricKey::Crime => &CRIME,
            MetricKey::Corruption => &CORRUPTION,
            MetricKey::JanFeels => &FEELS_LIKE[0],
            MetricKey::FebFeels => &FEELS_LIKE[1],
            MetricKey::MarFeels => &FEELS_LIKE[2],
            MetricKey::AprFeels => &FEELS_LIKE[3],
            MetricKey::MayFeels => &FEELS_LIKE[4],
            MetricKey::JunFeels => &FEELS_LIKE[5],
            MetricKey::JulFeels => &FEELS_LIKE[6],
            MetricKey::AugFeels => &FEELS_LIKE[7],
            MetricKey::SepFeels => &FEELS_LIKE[8],
            MetricKey::OctFeels => &FEELS_LIKE[9],
            MetricKey::NovFeels => &FEELS_LIKE[10],
            MetricKey::DecFeels => &FEELS_LIKE[11],
        }
    }

    /// Month index (0 = January) for weather metrics, `None` otherwise.
    pub fn month_index(self) -> Option<usize> {
        WEATHER_METRICS.iter().position(|&k| k == self)
    }

    #[inline]
    pub fn is_weather(self) -> bool {
        self.month_index().is_some()
    }

    #[inline]
    pub fn is_reversed(self) -> bool {
        REVERSED_METRICS.contains(&self)
    }

    pub fn gradient(self) -> GradientFamily {
        if self.is_weather() {
            GradientFamily::Weather
        } else {
            GradientFamily::Standard
        }
    }

    /// Table the metric's column lives in.
    pub fn table_source(self) -> TableSource {
        if self.is_weather() {
            TableSource::SubdivisionWeather
        } else {
            TableSource::CountryValues
        }
    }

    /// Kebab-case identifier, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::PotableWater => "potable-water",
            MetricKey::DemocracyIndex => "democracy-index",
            MetricKey::Smartraveller => "smartraveller",
            MetricKey::CostOfLiving => "cost-of-living",
            MetricKey::Hdi => "hdi",
            MetricKey::Crime => "crime",
            MetricKey::Corruption => "corruption",
            MetricKey::JanFeels => "jan-feels",
            MetricKey::FebFeels => "feb-feels",
            MetricKey::MarFeels => "mar-feels",
            MetricKey::AprFeels => "apr-feels",
            MetricKey::MayFeels => "may-feels",
            MetricKey::JunFeels => "jun-feels",
            MetricKey::JulFeels => "jul-feels",
            MetricKey::AugFeels => "aug-feels",
            MetricKey::SepFeels => "sep-feels",
            MetricKey::OctFeels => "oct-feels",
            MetricKey::NovFeels => "nov-feels",
            MetricKey::DecFeels => "dec-feels",
        }
    }
}

/// Resolve a key to its catalog entry.
pub fn resolve(key: MetricKey) -> &'static Metric {
    key.metric()
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric key `{0}`")]
pub struct UnknownMetricKey(pub String);

impl FromStr for MetricKey {
    type Err = UnknownMetricKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownMetricKey(s.to_string()))
    }
}
