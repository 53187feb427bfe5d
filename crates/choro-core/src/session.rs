//! One interactive map session.
//!
//! The session owns the UI-facing state (selection, filters, map type) and
//! the derived outputs (value map, highlight set). Recomputation is split
//! in three steps so that no borrow of the session is held across I/O:
//!
//!   1. `plan_*` snapshots the inputs and issues a fresh [`RequestToken`].
//!   2. The request runs against a [`ValueResolver`] (may suspend).
//!   3. `commit_*` installs the result only if its token is still the
//!      latest one issued for that output; older completions are dropped.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::MetricKey;
use crate::dataset::{BoundaryCollection, RegionNames};
use crate::error::LoadResult;
use crate::fetch::SourceFetcher;
use crate::filter::{build_predicates, FilterState, Predicate};
use crate::resolve::{HighlightSet, ValueMap, ValueResolver};
use crate::selection::{ActiveSelection, InvalidMonth, MonthIndex};
use crate::source::{MapType, TableSource};
use crate::style::{region_fill, Palette, RegionStyle};

/// Monotonic tag identifying one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

/// Inputs of a value resolution; compared structurally to skip redundant work.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTarget {
    pub key: MetricKey,
    pub column: usize,
    pub source: TableSource,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone)]
pub struct ValueRequest {
    pub token: RequestToken,
    /// `None` when no metric is selected.
    pub target: Option<ValueTarget>,
}

#[derive(Debug, Clone)]
pub struct ValueUpdate {
    pub token: RequestToken,
    pub key: Option<MetricKey>,
    pub values: ValueMap,
    /// False when the table failed to load and `values` is a stand-in.
    pub loaded: bool,
}

impl ValueRequest {
    pub async fn run<F: SourceFetcher>(self, resolver: &ValueResolver<F>) -> ValueUpdate {
        let Some(t) = &self.target else {
            return ValueUpdate { token: self.token, key: None, values: ValueMap::default(), loaded: true };
        };
        let (values, loaded) = match resolver.try_resolve(t.column, t.source, &t.predicates).await {
            Ok(values) => (values, true),
            Err(err) => {
                warn!(%err, key = %t.key, "values unavailable, using empty map");
                (ValueMap::default(), false)
            }
        };
        ValueUpdate { token: self.token, key: Some(t.key), values, loaded }
    }
}

#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pub token: RequestToken,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone)]
pub struct HighlightUpdate {
    pub token: RequestToken,
    pub highlights: HighlightSet,
    pub loaded: bool,
}

impl HighlightRequest {
    pub async fn run<F: SourceFetcher>(self, resolver: &ValueResolver<F>) -> HighlightUpdate {
        let (highlights, loaded) = match resolver.try_highlight(&self.predicates).await {
            Ok(set) => (set, true),
            Err(err) => {
                warn!(%err, "highlights unavailable, using empty set");
                (HighlightSet::default(), false)
            }
        };
        HighlightUpdate { token: self.token, highlights, loaded }
    }
}

/// A boundary region with its resolved style, as handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct PaintedRegion {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub value: Option<f64>,
    pub highlighted: bool,
    pub style: RegionStyle,
}

#[derive(Debug, Clone)]
pub struct Session {
    selection: ActiveSelection,
    filters: FilterState,
    map_type: MapType,
    palette: Palette,

    values: ValueMap,
    values_key: Option<MetricKey>,
    highlights: HighlightSet,

    next_token: u64,
    latest_value: Option<RequestToken>,
    latest_highlight: Option<RequestToken>,
    planned_target: Option<Option<ValueTarget>>,
    planned_predicates: Option<Vec<Predicate>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl Session {
    pub fn new(palette: Palette) -> Self {
        Self {
            selection: ActiveSelection::initial(),
            filters: FilterState::default(),
            map_type: MapType::default(),
            palette,
            values: ValueMap::default(),
            values_key: None,
            highlights: HighlightSet::default(),
            next_token: 0,
            latest_value: None,
            latest_highlight: None,
            planned_target: None,
            planned_predicates: None,
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────────

    pub fn selection(&self) -> ActiveSelection {
        self.selection
    }

    pub fn select(&mut self, key: MetricKey) {
        self.selection = ActiveSelection::for_key(key);
    }

    /// Gradient radio change.
    pub fn toggle_metric(&mut self, key: MetricKey, checked: bool) {
        self.selection = ActiveSelection::toggle(key, checked);
    }

    pub fn clear_metric(&mut self) {
        self.selection = ActiveSelection::None;
    }

    /// Month scrubber change; replaces any named metric.
    pub fn scrub(&mut self, month: usize) -> Result<MonthIndex, InvalidMonth> {
        let month = MonthIndex::new(month)?;
        self.selection = ActiveSelection::Weather(month);
        Ok(month)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    pub fn set_map_type(&mut self, map_type: MapType) {
        self.map_type = map_type;
    }

    // ── Outputs ──────────────────────────────────────────────────────────

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Metric the committed value map was resolved for.
    pub fn values_key(&self) -> Option<MetricKey> {
        self.values_key
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    // ── Recomputation ────────────────────────────────────────────────────

    fn issue(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    fn value_target(&self) -> Option<ValueTarget> {
        let key = self.selection.metric_key()?;
        Some(ValueTarget {
            key,
            column: key.metric().column,
            source: key.table_source(),
            predicates: build_predicates(&self.filters),
        })
    }

    /// Snapshot the value inputs under a new token.
    pub fn plan_values(&mut self) -> ValueRequest {
        let target = self.value_target();
        let token = self.issue();
        self.latest_value = Some(token);
        self.planned_target = Some(target.clone());
        ValueRequest { token, target }
    }

    /// Like [`plan_values`](Self::plan_values), but `None` if the inputs equal
    /// the last planned ones.
    pub fn plan_values_if_changed(&mut self) -> Option<ValueRequest> {
        if self.planned_target.as_ref() == Some(&self.value_target()) {
            return None;
        }
        Some(self.plan_values())
    }

    /// Install a value result. Returns false if a newer request was issued.
    ///
    /// A result that stands in for a failed load is installed, but the plan
    /// is forgotten so the next `plan_values_if_changed` retries the load.
    pub fn commit_values(&mut self, update: ValueUpdate) -> bool {
        if self.latest_value != Some(update.token) {
            debug!(token = ?update.token, latest = ?self.latest_value, "dropping stale value update");
            return false;
        }
        if !update.loaded {
            self.planned_target = None;
        }
        self.values = update.values;
        self.values_key = update.key;
        true
    }

    pub fn plan_highlights(&mut self) -> HighlightRequest {
        let predicates = build_predicates(&self.filters);
        let token = self.issue();
        self.latest_highlight = Some(token);
        self.planned_predicates = Some(predicates.clone());
        HighlightRequest { token, predicates }
    }

    pub fn plan_highlights_if_changed(&mut self) -> Option<HighlightRequest> {
        if self.planned_predicates.as_ref() == Some(&build_predicates(&self.filters)) {
            return None;
        }
        Some(self.plan_highlights())
    }

    pub fn commit_highlights(&mut self, update: HighlightUpdate) -> bool {
        if self.latest_highlight != Some(update.token) {
            debug!(token = ?update.token, latest = ?self.latest_highlight, "dropping stale highlight update");
            return false;
        }
        if !update.loaded {
            self.planned_predicates = None;
        }
        self.highlights = update.highlights;
        true
    }

    /// Recompute whatever changed since the last plan, in sequence.
    pub async fn refresh<F: SourceFetcher>(&mut self, resolver: &ValueResolver<F>) {
        if let Some(request) = self.plan_values_if_changed() {
            let update = request.run(resolver).await;
            self.commit_values(update);
        }
        if let Some(request) = self.plan_highlights_if_changed() {
            let update = request.run(resolver).await;
            self.commit_highlights(update);
        }
    }

    /// Boundary layer for the current map type, through the shared cache.
    pub async fn layer<F: SourceFetcher>(
        &self,
        resolver: &ValueResolver<F>,
    ) -> LoadResult<Arc<BoundaryCollection>> {
        resolver.store().try_boundary(self.map_type).await
    }

    // ── View binding ─────────────────────────────────────────────────────

    pub fn style_for(&self, region: &RegionNames) -> RegionStyle {
        let fill = region_fill(region, &self.values, self.values_key, &self.highlights, &self.palette);
        RegionStyle::filled(fill)
    }

    /// Popup text: region name, then the metric value or "No data".
    pub fn popup_for(&self, region: &RegionNames) -> String {
        let name = region.display().unwrap_or_default();
        match (self.values_key, self.values.lookup(region)) {
            (Some(key), Some(value)) => format!("{name}\n{}: {value}", key.metric().name),
            _ => format!("{name}\nNo data"),
        }
    }

    pub fn paint(&self, layer: &BoundaryCollection) -> Vec<PaintedRegion> {
        layer
            .regions()
            .map(|region| {
                let style = self.style_for(&region);
                PaintedRegion {
                    value: self.values.lookup(&region),
                    highlighted: self.highlights.contains_region(&region),
                    style,
                    name: region.name,
                    name_en: region.name_en,
                }
            })
            .collect()
    }
}
