//! Source fetching seam.
//!
//! The store never touches I/O directly; it asks a [`SourceFetcher`] for the
//! raw text of a source path. Tests substitute an in-memory fetcher.

use std::future::Future;

use crate::error::LoadResult;

pub trait SourceFetcher: Send + Sync {
    /// Return the full text of the resource at `path`.
    fn fetch(&self, path: &str) -> impl Future<Output = LoadResult<String>> + Send;
}

#[cfg(feature = "native")]
pub use fs::FsFetcher;

#[cfg(feature = "native")]
mod fs {
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use super::SourceFetcher;
    use crate::error::{LoadError, LoadResult};

    /// Reads sources from disk, relative to a data root.
    #[derive(Debug, Clone)]
    pub struct FsFetcher {
        root: PathBuf,
    }

    impl FsFetcher {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        pub fn root(&self) -> &Path {
            &self.root
        }
    }

    impl SourceFetcher for FsFetcher {
        async fn fetch(&self, path: &str) -> LoadResult<String> {
            let full = self.root.join(path);
            debug!(path = %full.display(), "reading source");
            tokio::fs::read_to_string(&full)
                .await
                .map_err(|e| LoadError::fetch(path, e))
        }
    }

}
