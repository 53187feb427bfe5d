//! Value resolution and highlight computation.
//!
//! Both outputs are rebuilt from scratch on every call; nothing here patches
//! a previous result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset::{RegionNames, TabularDataset};
use crate::error::LoadResult;
use crate::fetch::SourceFetcher;
use crate::filter::{matches_all, Predicate};
use crate::source::TableSource;
use crate::store::DataStore;

/// Region name → metric value. Empty means "nothing to colour".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueMap(HashMap<String, f64>);

impl ValueMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Value for a boundary region, trying the primary name then the alternate.
    pub fn lookup(&self, region: &RegionNames) -> Option<f64> {
        region.keys().find_map(|k| self.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Names of regions that satisfy every active filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighlightSet(HashSet<String>);

impl HighlightSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// True if either join key of the region is highlighted.
    pub fn contains_region(&self, region: &RegionNames) -> bool {
        region.keys().any(|k| self.contains(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Scan `dataset` once and collect `column` for rows passing all predicates.
///
/// Empty rows and rows whose target cell is missing or not a number are
/// skipped. A repeated region name keeps the value of its last row.
pub fn resolve_values(dataset: &TabularDataset, column: usize, predicates: &[Predicate]) -> ValueMap {
    let mut values = HashMap::new();
    for row in &dataset.rows {
        let Some(name) = row.name() else { continue };
        if !matches_all(predicates, row) {
            continue;
        }
        if let Some(value) = row.number(column) {
            values.insert(name.to_string(), value);
        }
    }
    ValueMap(values)
}

/// Regions in `dataset` that pass every predicate.
///
/// With no predicates there is no active filter, so nothing is highlighted.
pub fn highlight_matches(dataset: &TabularDataset, predicates: &[Predicate]) -> HighlightSet {
    if predicates.is_empty() {
        return HighlightSet::default();
    }
    dataset
        .rows
        .iter()
        .filter(|row| matches_all(predicates, row))
        .filter_map(|row| row.name().map(str::to_string))
        .collect()
}

/// Resolves values and highlights against a shared [`DataStore`].
pub struct ValueResolver<F> {
    store: Arc<DataStore<F>>,
}

impl<F> Clone for ValueResolver<F> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<F: SourceFetcher> ValueResolver<F> {
    pub fn new(store: Arc<DataStore<F>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DataStore<F>> {
        &self.store
    }

    /// Values of `column` in `source` for rows passing `predicates`, or the
    /// load error if the table is unavailable.
    pub async fn try_resolve(
        &self,
        column: usize,
        source: TableSource,
        predicates: &[Predicate],
    ) -> LoadResult<ValueMap> {
        let dataset = self.store.try_table(source).await?;
        let values = resolve_values(&dataset, column, predicates);
        debug!(
            source = %source,
            column,
            predicates = predicates.len(),
            rows = dataset.len(),
            values = values.len(),
            "resolved values"
        );
        Ok(values)
    }

    /// Like [`try_resolve`](Self::try_resolve); load failures yield an empty map.
    pub async fn resolve(&self, column: usize, source: TableSource, predicates: &[Predicate]) -> ValueMap {
        self.try_resolve(column, source, predicates)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "values unavailable, using empty map");
                ValueMap::default()
            })
    }

    /// Filter matches over the country table, which holds every filter column.
    /// No predicates means no highlight and no load.
    pub async fn try_highlight(&self, predicates: &[Predicate]) -> LoadResult<HighlightSet> {
        if predicates.is_empty() {
            return Ok(HighlightSet::default());
        }
        let dataset = self.store.try_table(TableSource::CountryValues).await?;
        let set = highlight_matches(&dataset, predicates);
        debug!(predicates = predicates.len(), matches = set.len(), "resolved highlights");
        Ok(set)
    }

    pub async fn highlight(&self, predicates: &[Predicate]) -> HighlightSet {
        self.try_highlight(predicates).await.unwrap_or_else(|err| {
            warn!(%err, "highlights unavailable, using empty set");
            HighlightSet::default()
        })
    }
}
