//! Per-region fill decisions handed to the map renderer.

use serde::{Deserialize, Serialize};

use crate::catalog::MetricKey;
use crate::dataset::RegionNames;
use crate::gradient::{colour_for_key, Rgb};
use crate::resolve::{HighlightSet, ValueMap};

/// Fallback fills for regions the gradient does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub neutral: Rgb,
    pub highlight: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self { neutral: Rgb::NEUTRAL, highlight: Rgb::HIGHLIGHT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionStyle {
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub stroke: Rgb,
    pub weight: u32,
}

impl RegionStyle {
    pub fn filled(fill: Rgb) -> Self {
        Self { fill, fill_opacity: 0.7, stroke: Rgb::BLACK, weight: 1 }
    }
}

/// Fill for one region.
///
/// A region with a value is drawn on the metric's gradient, which takes
/// precedence over highlighting. Otherwise highlighted regions get the
/// highlight fill and the rest the neutral fill. An empty value map never
/// reaches the gradient.
pub fn region_fill(
    region: &RegionNames,
    values: &ValueMap,
    metric: Option<MetricKey>,
    highlights: &HighlightSet,
    palette: &Palette,
) -> Rgb {
    if let Some(key) = metric.filter(|_| !values.is_empty()) {
        if let Some(value) = values.lookup(region) {
            return colour_for_key(value, key);
        }
    }
    if highlights.contains_region(region) {
        palette.highlight
    } else {
        palette.neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str) -> RegionNames {
        RegionNames { name: Some(name.to_string()), name_en: None }
    }

    #[test]
    fn valued_regions_use_the_gradient() {
        let values: ValueMap = [("Chad".to_string(), 100.0)].into_iter().collect();
        let fill = region_fill(
            &region("Chad"),
            &values,
            Some(MetricKey::Crime),
            &HighlightSet::default(),
            &Palette::default(),
        );
        assert_eq!(fill, Rgb::new(255, 0, 0));
    }

    #[test]
    fn unmatched_regions_fall_back() {
        let values: ValueMap = [("Chad".to_string(), 100.0)].into_iter().collect();
        let highlights: HighlightSet = ["Peru".to_string()].into_iter().collect();
        let palette = Palette::default();
        let key = Some(MetricKey::Crime);

        assert_eq!(region_fill(&region("Peru"), &values, key, &highlights, &palette), Rgb::HIGHLIGHT);
        assert_eq!(region_fill(&region("Fiji"), &values, key, &highlights, &palette), Rgb::NEUTRAL);
    }

    #[test]
    fn no_metric_means_no_gradient() {
        let values: ValueMap = [("Chad".to_string(), 100.0)].into_iter().collect();
        let fill = region_fill(
            &region("Chad"),
            &values,
            None,
            &HighlightSet::default(),
            &Palette::default(),
        );
        assert_eq!(fill, Rgb::NEUTRAL);
    }

    #[test]
    fn default_style_matches_the_map_layer() {
        let style = RegionStyle::filled(Rgb::NEUTRAL);
        assert_eq!(style.weight, 1);
        assert_eq!(style.stroke, Rgb::BLACK);
        assert!((style.fill_opacity - 0.7).abs() < f32::EPSILON);
    }
}
