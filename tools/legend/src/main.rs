//! Legend renderer: writes one horizontal PNG ramp per metric.
//!
//! Usage: `legend [OUT_DIR]` (default `data/legend`). The left edge is the
//! metric's declared minimum and the right edge its maximum, so reversed
//! metrics read red → green.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use choro_core::catalog::MetricKey;
use choro_core::gradient::colour_for_key;

const W: u32 = 256;
const H: u32 = 20;

/// Metric value under column `x` of a `W`-wide ramp.
fn value_at(key: MetricKey, x: u32) -> f64 {
    let metric = key.metric();
    metric.min + metric.span() * f64::from(x) / f64::from(W - 1)
}

fn ramp(key: MetricKey) -> image::RgbImage {
    let mut img = image::RgbImage::new(W, H);
    for x in 0..W {
        let px = image::Rgb(colour_for_key(value_at(key, x), key).to_array());
        for y in 0..H {
            img.put_pixel(x, y, px);
        }
    }
    img
}

/// Write every metric's ramp into `out_dir`; returns the files written.
fn write_legends(out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(MetricKey::ALL.len());
    for key in MetricKey::ALL {
        let path = out_dir.join(format!("{key}.png"));
        ramp(key)
            .save(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("Wrote {} ({} {}..{})", path.display(), key.metric().name, key.metric().min, key.metric().max);
        written.push(path);
    }
    Ok(written)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/legend"));
    write_legends(&out_dir)?;
    println!("Done.");
    Ok(())
}
