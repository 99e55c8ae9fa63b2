//! Shared Cache Module
//!
//! Thread-safe handle over a [`CacheStore`]. Every operation, including the
//! metrics snapshot, runs under one exclusive lock: lookups reorder recency,
//! so there is no read-only path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStore, Clock, EstimateSize, MetricsSnapshot, SetOutcome};
use crate::config::CacheConfig;
use crate::error::Result;

// == Shared Cache ==
/// Cloneable handle to a single cache instance.
///
/// The lock is never held across an await point or upstream call.
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<Mutex<CacheStore<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: EstimateSize + Clone> SharedCache<V> {
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheStore::new(config).map(Self::from_store)
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        CacheStore::with_clock(config, clock).map(Self::from_store)
    }

    pub fn from_store(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key)
    }

    pub fn set(
        &self,
        key: impl Into<String>,
        value: V,
        ttl_override: Option<Duration>,
    ) -> SetOutcome {
        self.inner.lock().set(key, value, ttl_override)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    pub fn purge_expired(&self) -> usize {
        self.inner.lock().purge_expired()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.lock().metrics()
    }

    pub fn current_memory_usage(&self) -> usize {
        self.inner.lock().current_memory_usage()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetch` on a miss.
    ///
    /// The lock is released while `fetch` runs. A successful result is
    /// stored before being returned; an error is passed through and nothing
    /// is cached. Concurrent misses on the same key each fetch, and the last
    /// one to store wins.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        debug!(key, "cache miss, fetching from upstream");
        let value = fetch().await?;
        self.set(key, value.clone(), None);
        Ok(value)
    }
}
