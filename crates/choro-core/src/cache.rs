//! Keyed, load-once cache with single-flight loading.
//!
//! Entries live for the lifetime of the cache: sources are static files, so
//! there is no eviction and no TTL. Failed loads are not stored, which lets
//! the next request retry.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::error::LoadResult;

pub struct LoadCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
    /// Per-key gates; holders of a gate are the only loaders for that key.
    inflight: Mutex<HashMap<K, Arc<Mutex<()>>>>,
    loads: AtomicUsize,
}

impl<K, V> Default for LoadCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }
}

impl<K, V> LoadCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, without loading.
    pub async fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of loader invocations so far (hits and waiters excluded).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Return the cached value, or run `load` once and cache its result.
    ///
    /// Concurrent callers for the same missing key wait on the first
    /// caller's load instead of starting their own. On error nothing is
    /// cached and the error goes to the caller that ran the load; waiters
    /// and new callers then retry one at a time through the same gate.
    pub async fn get_or_load<F, Fut>(&self, key: K, load: F) -> LoadResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadResult<V>>,
    {
        if let Some(hit) = self.peek(&key).await {
            debug!(?key, "cache hit");
            return Ok(hit);
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = gate.lock().await;

        // Another caller may have finished the load while we waited.
        if let Some(hit) = self.peek(&key).await {
            debug!(?key, "cache filled by concurrent load");
            return Ok(hit);
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let result = load().await;

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                self.entries.write().await.insert(key.clone(), Arc::clone(&value));
                self.inflight.lock().await.remove(&key);
                Ok(value)
            }
            // The gate stays registered: waiters and later callers share it,
            // so the retry is still a single load.
            Err(err) => Err(err),
        }
    }
}
