//! Cached access to table and boundary sources.
//!
//! `DataStore` pairs a [`SourceFetcher`] with one [`LoadCache`] per source
//! kind. The `try_*` methods surface load errors; the plain methods log them
//! and fall back to an empty dataset, which is what the resolvers use.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::LoadCache;
#[cfg(feature = "native")]
use crate::config::EngineConfig;
use crate::dataset::{parse_boundaries, parse_table, BoundaryCollection, TabularDataset};
use crate::error::{LoadError, LoadResult};
use crate::fetch::SourceFetcher;
#[cfg(feature = "native")]
use crate::fetch::FsFetcher;
use crate::source::{MapType, TableSource};

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DataStore<F> {
    fetcher: F,
    tables: LoadCache<TableSource, TabularDataset>,
    boundaries: LoadCache<MapType, BoundaryCollection>,
    timeout: Duration,
}

impl<F: SourceFetcher> DataStore<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_timeout(fetcher, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_timeout(fetcher: F, timeout: Duration) -> Self {
        Self {
            fetcher,
            tables: LoadCache::new(),
            boundaries: LoadCache::new(),
            timeout,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn tables(&self) -> &LoadCache<TableSource, TabularDataset> {
        &self.tables
    }

    pub fn boundaries(&self) -> &LoadCache<MapType, BoundaryCollection> {
        &self.boundaries
    }

    pub async fn try_table(&self, source: TableSource) -> LoadResult<Arc<TabularDataset>> {
        self.tables
            .get_or_load(source, || async move {
                let text = self.fetch_text(source.path()).await?;
                let table = parse_table(&text);
                info!(source = %source, rows = table.len(), "loaded table");
                Ok(table)
            })
            .await
    }

    pub async fn try_boundary(&self, map_type: MapType) -> LoadResult<Arc<BoundaryCollection>> {
        self.boundaries
            .get_or_load(map_type, || async move {
                let text = self.fetch_text(map_type.path()).await?;
                let layer = parse_boundaries(map_type.path(), &text)?;
                info!(source = %map_type, features = layer.len(), "loaded boundaries");
                Ok(layer)
            })
            .await
    }

    /// Table for `source`, or an empty table if it cannot be loaded.
    pub async fn table(&self, source: TableSource) -> Arc<TabularDataset> {
        match self.try_table(source).await {
            Ok(table) => table,
            Err(err) => {
                warn!(%err, "table unavailable, using empty dataset");
                Arc::new(TabularDataset::default())
            }
        }
    }

    /// Boundary layer for `map_type`, or an empty layer if it cannot be loaded.
    pub async fn boundary(&self, map_type: MapType) -> Arc<BoundaryCollection> {
        match self.try_boundary(map_type).await {
            Ok(layer) => layer,
            Err(err) => {
                warn!(%err, "boundaries unavailable, using empty layer");
                Arc::new(BoundaryCollection::default())
            }
        }
    }

    async fn fetch_text(&self, path: &str) -> LoadResult<String> {
        tokio::time::timeout(self.timeout, self.fetcher.fetch(path))
            .await
            .map_err(|_| LoadError::Timeout { source_id: path.to_string(), timeout: self.timeout })?
    }
}

#[cfg(feature = "native")]
impl DataStore<FsFetcher> {
    /// Filesystem-backed store rooted at `config.data_root`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_timeout(FsFetcher::new(config.data_root.clone()), config.load_timeout())
    }
}
