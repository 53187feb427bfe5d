//! Metric resolution and gradient colouring for region maps.
//!
//! Pipeline:
//!   selection + filters → predicates → value scan over a cached table →
//!   per-region gradient colour.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod gradient;
pub mod resolve;
pub mod selection;
pub mod session;
pub mod source;
pub mod store;
pub mod style;

pub use catalog::{Metric, MetricKey};
pub use config::EngineConfig;
pub use dataset::{BoundaryCollection, DataRow, RegionNames, TabularDataset};
pub use error::{LoadError, LoadResult};
pub use fetch::SourceFetcher;
#[cfg(feature = "native")]
pub use fetch::FsFetcher;
pub use filter::{build_predicates, FilterKind, FilterState, Predicate};
pub use gradient::{colour_for, GradientFamily, Rgb};
pub use resolve::{resolve_values, HighlightSet, ValueMap, ValueResolver};
pub use selection::{ActiveSelection, MonthIndex};
pub use session::Session;
pub use source::{MapType, TableSource};
pub use store::DataStore;

