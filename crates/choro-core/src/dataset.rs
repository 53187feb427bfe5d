//! Parsed forms of the two source formats.
//!
//! Tokenising is delegated to `csv` and `geojson`; this module only adapts
//! their output into the row and region shapes the engine scans.

use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use tracing::debug;

use crate::error::{LoadError, LoadResult};

// ── Tabular ──────────────────────────────────────────────────────────────────

/// One table row. Cell 0 is the region name; other cells are metric columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataRow(pub Vec<String>);

impl DataRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Region name, or `None` for an empty row.
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Cell parsed as a finite number.
    ///
    /// Missing, blank, malformed and non-finite cells all yield `None`, which
    /// every caller treats as "does not match".
    pub fn number(&self, column: usize) -> Option<f64> {
        self.cell(column)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// True when the cell is the literal `true` token, ignoring case.
    pub fn flag(&self, column: usize) -> bool {
        self.cell(column)
            .is_some_and(|c| c.trim().eq_ignore_ascii_case("true"))
    }
}

/// All rows of one table source, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularDataset {
    pub rows: Vec<DataRow>,
}

impl TabularDataset {
    pub fn new(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse headerless CSV text.
///
/// Rows the tokenizer rejects are dropped individually; the remaining rows
/// are kept in order. Rows may have differing cell counts.
pub fn parse_table(text: &str) -> TabularDataset {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(DataRow::new(record.iter())),
            Err(err) => {
                skipped += 1;
                debug!(%err, "skipping malformed csv row");
            }
        }
    }
    if skipped > 0 {
        debug!(skipped, kept = rows.len(), "csv parsed with skipped rows");
    }
    TabularDataset::new(rows)
}

// ── Boundaries ───────────────────────────────────────────────────────────────

/// Join keys of one boundary feature, trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionNames {
    pub name: Option<String>,
    pub name_en: Option<String>,
}

impl RegionNames {
    /// Display name: primary name first, English alternate otherwise.
    pub fn display(&self) -> Option<&str> {
        self.name.as_deref().or(self.name_en.as_deref())
    }

    /// Both join keys in lookup order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.name.as_deref().into_iter().chain(self.name_en.as_deref())
    }
}

/// A parsed boundary layer.
#[derive(Debug, Clone)]
pub struct BoundaryCollection {
    pub features: FeatureCollection,
}

impl Default for BoundaryCollection {
    fn default() -> Self {
        Self {
            features: FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            },
        }
    }
}

impl BoundaryCollection {
    pub fn len(&self) -> usize {
        self.features.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.features.is_empty()
    }

    /// Join keys of every feature, in document order.
    pub fn regions(&self) -> impl Iterator<Item = RegionNames> + '_ {
        self.features.features.iter().map(|feature| {
            let text = |key: &str| {
                feature
                    .property(key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };
            RegionNames { name: text("name"), name_en: text("name_en") }
        })
    }
}

/// Parse a GeoJSON document that must be a FeatureCollection.
pub fn parse_boundaries(source_id: &str, text: &str) -> LoadResult<BoundaryCollection> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| LoadError::parse(source_id, e))?;
    let features = FeatureCollection::try_from(geojson)
        .map_err(|e| LoadError::parse(source_id, e))?;
    Ok(BoundaryCollection { features })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_their_own_length() {
        let table = parse_table("France,true,80\nChad,false\nPeru,true,70,1.5\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.rows[2].cell(3), Some("1.5"));
    }

    #[test]
    fn quoted_names_with_commas_survive() {
        let table = parse_table("\"Korea, Republic of\",true,85\n");
        assert_eq!(table.rows[0].name(), Some("Korea, Republic of"));
        assert_eq!(table.rows[0].number(2), Some(85.0));
    }

    #[test]
    fn number_rejects_blank_and_malformed_cells() {
        let row = DataRow::new(["X", "", "n/a", " 12.5 ", "NaN", "inf"]);
        assert_eq!(row.number(1), None);
        assert_eq!(row.number(2), None);
        assert_eq!(row.number(3), Some(12.5));
        assert_eq!(row.number(4), None);
        assert_eq!(row.number(5), None);
        assert_eq!(row.number(9), None);
    }

    #[test]
    fn flag_is_case_insensitive() {
        let row = DataRow::new(["X", "TRUE", "True", "false", "1"]);
        assert!(row.flag(1));
        assert!(row.flag(2));
        assert!(!row.flag(3));
        assert!(!row.flag(4));
        assert!(!row.flag(7));
    }

    #[test]
    fn boundary_regions_expose_trimmed_names() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null,
                 "properties": {"name": " Deutschland ", "name_en": "Germany"}},
                {"type": "Feature", "geometry": null,
                 "properties": {"name_en": "Chad"}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }"#;
        let layer = parse_boundaries("test", text).unwrap();
        let regions: Vec<_> = layer.regions().collect();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].name.as_deref(), Some("Deutschland"));
        assert_eq!(regions[0].keys().collect::<Vec<_>>(), vec!["Deutschland", "Germany"]);
        assert_eq!(regions[1].display(), Some("Chad"));
        assert_eq!(regions[2].display(), None);
    }

    #[test]
    fn non_collection_geojson_is_a_parse_error() {
        let point = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(matches!(
            parse_boundaries("pt", point),
            Err(LoadError::Parse { .. })
        ));
        assert!(parse_boundaries("junk", "not json").is_err());
    }
}
