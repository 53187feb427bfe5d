//! Piecewise linear colour ramps.
//!
//! A value is normalised against its metric's declared range, optionally
//! reversed, clamped to [0, 1] and then mapped through one of two ramps:
//!
//! ```text
//!   Standard:  0 ── green ── 0.33 ── yellow ── 0.66 ── red ── 1
//!              (red rises)           (green falls)     (solid)
//!
//!   Weather:   0 ── blue ── 0.5 ── green ── 0.75 ── yellow ── 1 ── red
//! ```
//!
//! Values outside the metric range saturate at the ramp ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Metric, MetricKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// `#ccc`, used for regions without data.
    pub const NEUTRAL: Rgb = Rgb::new(204, 204, 204);
    /// CSS `green`, used for highlighted regions without data.
    pub const HIGHLIGHT: Rgb = Rgb::new(0, 128, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, e.g. `rgb(255,124,0)`.
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Which ramp a metric is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradientFamily {
    /// Green → yellow → orange → red.
    Standard,
    /// Blue → green → yellow → red, for temperatures.
    Weather,
}

impl GradientFamily {
    pub fn from_weather_flag(is_weather: bool) -> Self {
        if is_weather { Self::Weather } else { Self::Standard }
    }
}

/// Position of `value` within the metric range, reversed if asked.
///
/// Not clamped: values outside `[min, max]` land outside `[0, 1]`.
pub fn normalised_ratio(value: f64, metric: &Metric, reverse: bool) -> f64 {
    let ratio = (value - metric.min) / metric.span();
    if reverse { 1.0 - ratio } else { ratio }
}

/// Colour for `value` on the given ramp.
pub fn colour_for(value: f64, metric: &Metric, reverse: bool, family: GradientFamily) -> Rgb {
    let t = normalised_ratio(value, metric, reverse).clamp(0.0, 1.0);
    match family {
        GradientFamily::Standard => standard_ramp(t),
        GradientFamily::Weather => weather_ramp(t),
    }
}

/// Colour for `value` using the catalog's reversal and ramp for `key`.
pub fn colour_for_key(value: f64, key: MetricKey) -> Rgb {
    colour_for(value, key.metric(), key.is_reversed(), key.gradient())
}

fn standard_ramp(t: f64) -> Rgb {
    if t < 0.33 {
        Rgb::new(channel(255.0 * (t / 0.33)), 255, 0)
    } else if t < 0.66 {
        Rgb::new(255, channel(255.0 * (1.0 - (t - 0.33) / 0.33)), 0)
    } else {
        Rgb::new(255, 0, 0)
    }
}

fn weather_ramp(t: f64) -> Rgb {
    if t < 0.5 {
        let s = t / 0.5;
        Rgb::new(0, channel(255.0 * s), channel(255.0 * (1.0 - s)))
    } else if t < 0.75 {
        let s = (t - 0.5) / 0.25;
        Rgb::new(channel(255.0 * s), 255, 0)
    } else {
        let s = (t - 0.75) / 0.25;
        Rgb::new(255, channel(255.0 * (1.0 - s)), 0)
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cost() -> &'static Metric {
        MetricKey::CostOfLiving.metric()
    }

    fn jan() -> &'static Metric {
        MetricKey::JanFeels.metric()
    }

    #[test]
    fn standard_ramp_stops() {
        let m = cost(); // 10..100
        assert_eq!(colour_for(10.0, m, false, GradientFamily::Standard), Rgb::new(0, 255, 0));
        // ratio 0.5: g = round(255 * (1 - 0.17 / 0.33)) = 124
        assert_eq!(colour_for(55.0, m, false, GradientFamily::Standard), Rgb::new(255, 124, 0));
        assert_eq!(colour_for(100.0, m, false, GradientFamily::Standard), Rgb::new(255, 0, 0));
    }

    #[test]
    fn standard_ramp_is_continuous_at_first_stop() {
        let below = standard_ramp(0.3299);
        let at = standard_ramp(0.33);
        assert_eq!(at, Rgb::new(255, 255, 0));
        assert!(below.r >= 254 && below.g == 255);
    }

    #[test]
    fn weather_ramp_stops() {
        let m = jan(); // -10..45
        let w = GradientFamily::Weather;
        assert_eq!(colour_for(-10.0, m, false, w), Rgb::new(0, 0, 255));
        // ratio 0.25: halfway blue → green, 127.5 rounds up.
        assert_eq!(colour_for(3.75, m, false, w), Rgb::new(0, 128, 128));
        assert_eq!(colour_for(17.5, m, false, w), Rgb::new(0, 255, 0));
        assert_eq!(colour_for(31.25, m, false, w), Rgb::new(255, 255, 0));
        assert_eq!(colour_for(45.0, m, false, w), Rgb::new(255, 0, 0));
    }

    #[test]
    fn in_range_ratio_is_unit_interval() {
        for key in MetricKey::ALL {
            let m = key.metric();
            for i in 0..=20 {
                let v = m.min + m.span() * i as f64 / 20.0;
                for reverse in [false, true] {
                    let r = normalised_ratio(v, m, reverse);
                    assert!((-1e-12..=1.0 + 1e-12).contains(&r), "{key} v={v} ratio={r}");
                }
            }
        }
    }

    #[test]
    fn out_of_range_values_saturate() {
        let m = cost();
        assert_relative_eq!(normalised_ratio(190.0, m, false), 2.0);
        assert_eq!(colour_for(190.0, m, false, GradientFamily::Standard), Rgb::new(255, 0, 0));
        assert_eq!(colour_for(-500.0, m, false, GradientFamily::Standard), Rgb::new(0, 255, 0));
        assert_eq!(colour_for(-40.0, jan(), false, GradientFamily::Weather), Rgb::new(0, 0, 255));
        assert_eq!(colour_for(80.0, jan(), false, GradientFamily::Weather), Rgb::new(255, 0, 0));
    }

    #[test]
    fn reversal_mirrors_the_range() {
        let m = cost();
        for v in [10.0, 32.5, 55.0, 77.5, 100.0] {
            let mirrored = m.max - (v - m.min);
            for family in [GradientFamily::Standard, GradientFamily::Weather] {
                assert_eq!(
                    colour_for(v, m, true, family),
                    colour_for(mirrored, m, false, family),
                    "v={v} family={family:?}"
                );
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_colours() {
        let m = MetricKey::Hdi.metric();
        let a = colour_for(0.71, m, true, GradientFamily::Standard);
        let b = colour_for(0.71, m, true, GradientFamily::Standard);
        assert_eq!(a, b);
    }

    #[test]
    fn catalog_policy_reverses_hdi() {
        // High HDI is drawn at the green end.
        assert_eq!(colour_for_key(1.0, MetricKey::Hdi), Rgb::new(0, 255, 0));
        assert_eq!(colour_for_key(100.0, MetricKey::Crime), Rgb::new(255, 0, 0));
        assert_eq!(colour_for_key(-10.0, MetricKey::JulFeels), Rgb::new(0, 0, 255));
    }

    #[test]
    fn css_and_hex_forms() {
        let c = Rgb::new(255, 124, 0);
        assert_eq!(c.to_css(), "rgb(255,124,0)");
        assert_eq!(c.to_string(), "rgb(255,124,0)");
        assert_eq!(c.to_hex(), "#ff7c00");
        assert_eq!(Rgb::NEUTRAL.to_hex(), "#cccccc");
    }
}
