//! Recognised data-source identifiers.
//!
//! Paths are relative to the configured data root and double as cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Headerless CSV tables the engine reads metric values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableSource {
    CountryValues,
    SubdivisionWeather,
}

impl TableSource {
    pub const ALL: [TableSource; 2] = [TableSource::CountryValues, TableSource::SubdivisionWeather];

    pub fn path(self) -> &'static str {
        match self {
            TableSource::CountryValues => "data/countries_values.csv",
            TableSource::SubdivisionWeather => "data/subdivisions_weather.csv",
        }
    }
}

/// Boundary layers the map can display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapType {
    #[default]
    Countries,
    Subdivisions,
}

impl MapType {
    pub const ALL: [MapType; 2] = [MapType::Countries, MapType::Subdivisions];

    pub fn path(self) -> &'static str {
        match self {
            MapType::Countries => "data/countries.geo.json",
            MapType::Subdivisions => "data/subdivisions.geo.json",
        }
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
