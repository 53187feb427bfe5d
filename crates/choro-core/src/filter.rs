//! Filter toggles and the row predicates derived from them.

use serde::{Deserialize, Serialize};

use crate::catalog::MetricKey;
use crate::dataset::DataRow;

/// How a filter compares its column against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// `value > threshold`
    Above,
    /// `value < threshold`
    Below,
    /// Cell is the `true` token; no threshold.
    IsTrue,
}

/// The filters offered by the control panel, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    PotableWater,
    DemocracyIndex,
    CostOfLiving,
    Hdi,
    Crime,
    Corruption,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::PotableWater,
        FilterKind::DemocracyIndex,
        FilterKind::CostOfLiving,
        FilterKind::Hdi,
        FilterKind::Crime,
        FilterKind::Corruption,
    ];

    pub fn metric_key(self) -> MetricKey {
        match self {
            FilterKind::PotableWater => MetricKey::PotableWater,
            FilterKind::DemocracyIndex => MetricKey::DemocracyIndex,
            FilterKind::CostOfLiving => MetricKey::CostOfLiving,
            FilterKind::Hdi => MetricKey::Hdi,
            FilterKind::Crime => MetricKey::Crime,
            FilterKind::Corruption => MetricKey::Corruption,
        }
    }

    pub fn comparison(self) -> Comparison {
        match self {
            FilterKind::PotableWater => Comparison::IsTrue,
            FilterKind::DemocracyIndex | FilterKind::Hdi | FilterKind::Corruption => {
                Comparison::Above
            }
            FilterKind::CostOfLiving | FilterKind::Crime => Comparison::Below,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// One checkbox plus its threshold input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterToggle {
    pub enabled: bool,
    pub threshold: Option<f64>,
}

/// State of every filter toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    toggles: [FilterToggle; 6],
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&self, kind: FilterKind) -> FilterToggle {
        self.toggles[kind.index()]
    }

    pub fn set_enabled(&mut self, kind: FilterKind, enabled: bool) -> &mut Self {
        self.toggles[kind.index()].enabled = enabled;
        self
    }

    pub fn set_threshold(&mut self, kind: FilterKind, threshold: Option<f64>) -> &mut Self {
        self.toggles[kind.index()].threshold = threshold;
        self
    }

    /// Set a threshold from raw input text, see [`parse_threshold`].
    pub fn set_threshold_text(&mut self, kind: FilterKind, text: &str) -> &mut Self {
        self.set_threshold(kind, parse_threshold(text))
    }

    /// Shorthand for enabling a filter with a threshold.
    pub fn with(mut self, kind: FilterKind, threshold: Option<f64>) -> Self {
        self.set_enabled(kind, true).set_threshold(kind, threshold);
        self
    }

    pub fn any_enabled(&self) -> bool {
        self.toggles.iter().any(|t| t.enabled)
    }
}

/// Threshold input handling of the control panel.
///
/// Blank, unparsable, non-finite and zero inputs all clear the threshold.
pub fn parse_threshold(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// A boolean test on one data row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Predicate {
    Above { column: usize, threshold: f64 },
    Below { column: usize, threshold: f64 },
    IsTrue { column: usize },
}

impl Predicate {
    /// Rows with a missing or unparsable cell never match.
    pub fn matches(&self, row: &DataRow) -> bool {
        match *self {
            Predicate::Above { column, threshold } => {
                row.number(column).is_some_and(|v| v > threshold)
            }
            Predicate::Below { column, threshold } => {
                row.number(column).is_some_and(|v| v < threshold)
            }
            Predicate::IsTrue { column } => row.flag(column),
        }
    }
}

/// AND of all predicates, short-circuiting. Empty list matches every row.
pub fn matches_all(predicates: &[Predicate], row: &DataRow) -> bool {
    predicates.iter().all(|p| p.matches(row))
}

/// Derive predicates from the enabled toggles, in panel order.
///
/// Threshold filters without a threshold contribute nothing.
pub fn build_predicates(state: &FilterState) -> Vec<Predicate> {
    FilterKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let toggle = state.toggle(kind);
            if !toggle.enabled {
                return None;
            }
            let column = kind.metric_key().metric().column;
            match (kind.comparison(), toggle.threshold) {
                (Comparison::IsTrue, _) => Some(Predicate::IsTrue { column }),
                (Comparison::Above, Some(threshold)) => {
                    Some(Predicate::Above { column, threshold })
                }
                (Comparison::Below, Some(threshold)) => {
                    Some(Predicate::Below { column, threshold })
                }
                (_, None) => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> DataRow {
        DataRow::new(cells.iter().copied())
    }

    #[test]
    fn no_enabled_filters_build_nothing() {
        assert!(build_predicates(&FilterState::new()).is_empty());

        // A threshold alone does not enable a filter.
        let mut state = FilterState::new();
        state.set_threshold(FilterKind::Crime, Some(40.0));
        assert!(build_predicates(&state).is_empty());
    }

    #[test]
    fn enabled_without_threshold_is_skipped() {
        let state = FilterState::new().with(FilterKind::Hdi, None);
        assert!(build_predicates(&state).is_empty());
    }

    #[test]
    fn potable_water_needs_no_threshold() {
        let state = FilterState::new().with(FilterKind::PotableWater, None);
        assert_eq!(build_predicates(&state), vec![Predicate::IsTrue { column: 1 }]);
    }

    #[test]
    fn predicates_follow_panel_order_and_directions() {
        let state = FilterState::new()
            .with(FilterKind::Corruption, Some(30.0))
            .with(FilterKind::CostOfLiving, Some(50.0))
            .with(FilterKind::DemocracyIndex, Some(6.0))
            .with(FilterKind::Crime, Some(45.0));
        assert_eq!(
            build_predicates(&state),
            vec![
                Predicate::Above { column: 2, threshold: 6.0 },
                Predicate::Below { column: 4, threshold: 50.0 },
                Predicate::Below { column: 6, threshold: 45.0 },
                Predicate::Above { column: 7, threshold: 30.0 },
            ]
        );
    }

    #[test]
    fn comparisons_are_strict() {
        let above = Predicate::Above { column: 1, threshold: 5.0 };
        let below = Predicate::Below { column: 1, threshold: 5.0 };
        assert!(!above.matches(&row(&["A", "5"])));
        assert!(!below.matches(&row(&["A", "5"])));
        assert!(above.matches(&row(&["A", "5.01"])));
        assert!(below.matches(&row(&["A", "4.99"])));
    }

    #[test]
    fn malformed_or_short_rows_never_match() {
        let p = Predicate::Below { column: 4, threshold: 50.0 };
        assert!(!p.matches(&row(&["A", "true", "1", "2", "n/a"])));
        assert!(!p.matches(&row(&["A", "true"])));
        assert!(!p.matches(&row(&[])));
        assert!(!Predicate::IsTrue { column: 3 }.matches(&row(&["A"])));
    }

    #[test]
    fn empty_list_matches_everything() {
        assert!(matches_all(&[], &row(&["A"])));
        assert!(matches_all(&[], &row(&[])));
    }

    #[test]
    fn all_predicates_must_pass() {
        let ps = [
            Predicate::IsTrue { column: 1 },
            Predicate::Above { column: 2, threshold: 10.0 },
        ];
        assert!(matches_all(&ps, &row(&["A", "True", "11"])));
        assert!(!matches_all(&ps, &row(&["A", "false", "11"])));
        assert!(!matches_all(&ps, &row(&["A", "true", "9"])));
    }

    #[test]
    fn threshold_text_parsing() {
        assert_eq!(parse_threshold("42.5"), Some(42.5));
        assert_eq!(parse_threshold(" 7 "), Some(7.0));
        assert_eq!(parse_threshold("-3"), Some(-3.0));
        assert_eq!(parse_threshold(""), None);
        assert_eq!(parse_threshold("abc"), None);
        assert_eq!(parse_threshold("0"), None);
        assert_eq!(parse_threshold("inf"), None);
    }

    #[test]
    fn structurally_equal_states_build_equal_lists() {
        let a = FilterState::new().with(FilterKind::Hdi, Some(0.8));
        let mut b = FilterState::new();
        b.set_threshold_text(FilterKind::Hdi, "0.8").set_enabled(FilterKind::Hdi, true);
        assert_eq!(build_predicates(&a), build_predicates(&b));
    }
}
