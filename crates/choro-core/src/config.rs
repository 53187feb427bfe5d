//! Engine configuration.
//!
//! Read from JSON; any field left out keeps its default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gradient::Rgb;
use crate::style::Palette;

/// Engine settings. Every field has a default, so a config file only needs
/// the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory the source paths (`data/...`) are resolved against.
    pub data_root: PathBuf,
    /// Upper bound on a single fetch, in milliseconds.
    pub load_timeout_ms: u64,
    /// Fill for regions without a value.
    pub neutral_fill: Rgb,
    /// Fill for highlighted regions without a value.
    pub highlight_fill: Rgb,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            load_timeout_ms: 10_000,
            neutral_fill: Rgb::NEUTRAL,
            highlight_fill: Rgb::HIGHLIGHT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

impl EngineConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn palette(&self) -> Palette {
        Palette { neutral: self.neutral_fill, highlight: self.highlight_fill }
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{"load_timeout_ms": 250}"#).unwrap();
        assert_eq!(cfg.load_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.data_root, PathBuf::from("."));
        assert_eq!(cfg.neutral_fill, Rgb::NEUTRAL);
    }

    #[test]
    fn colours_round_trip_as_objects() {
        let cfg = EngineConfig::from_json_str(r#"{"highlight_fill": {"r": 1, "g": 2, "b": 3}}"#)
            .unwrap();
        assert_eq!(cfg.highlight_fill, Rgb::new(1, 2, 3));
    }

    #[test]
    fn file_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = EngineConfig::from_json_file(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.json"), "{err}");

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(matches!(EngineConfig::from_json_file(&bad), Err(ConfigError::Json { .. })));
    }
}
