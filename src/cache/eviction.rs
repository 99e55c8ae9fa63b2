//! Eviction Engine Module
//!
//! Enforces the item-count bound, the memory bound and TTL expiry against an
//! [`LruStore`], recording every removal it makes.

use std::time::Instant;

use tracing::debug;

use crate::cache::{CacheEvent, CacheMetrics, EvictionCause, LruStore};
use crate::config::CacheConfig;

// == Eviction Policy ==
/// Capacity bounds taken from the cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    max_size: usize,
    /// 0 disables the memory bound
    max_memory_bytes: usize,
}

impl EvictionPolicy {
    pub fn new(max_size: usize, max_memory_bytes: usize) -> Self {
        Self {
            max_size,
            max_memory_bytes,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.max_memory_bytes)
    }

    pub fn memory_bound_enabled(&self) -> bool {
        self.max_memory_bytes > 0
    }

    // == Admission ==
    /// Whether a value of `size_bytes` may be stored at all.
    ///
    /// A value larger than the whole memory bound could never fit, so it is
    /// refused before anything is evicted on its behalf.
    pub fn admits(&self, size_bytes: usize) -> bool {
        !self.memory_bound_enabled() || size_bytes <= self.max_memory_bytes
    }

    // == Memory Eviction ==
    /// Evicts least recently used entries until `incoming` more bytes fit.
    ///
    /// Returns the number of entries evicted.
    pub fn make_room<V>(
        &self,
        store: &mut LruStore<V>,
        incoming: usize,
        metrics: &mut CacheMetrics,
    ) -> usize {
        if !self.memory_bound_enabled() {
            return 0;
        }

        let mut evicted = 0;
        while store.total_bytes() + incoming > self.max_memory_bytes {
            if !evict_lru(store, EvictionCause::MemoryPressure, metrics) {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Count Eviction ==
    /// Evicts least recently used entries while the store is over `max_size`.
    ///
    /// Returns the number of entries evicted.
    pub fn enforce_size_limit<V>(&self, store: &mut LruStore<V>, metrics: &mut CacheMetrics) -> usize {
        let mut evicted = 0;
        while store.len() > self.max_size {
            if !evict_lru(store, EvictionCause::SizeLimit, metrics) {
                break;
            }
            evicted += 1;
        }
        evicted
    }
}

// == TTL Eviction ==
/// Removes `key` if its entry is stale at `now`.
///
/// Returns true if an entry was expired.
pub fn expire_if_stale<V>(
    store: &mut LruStore<V>,
    key: &str,
    now: Instant,
    metrics: &mut CacheMetrics,
) -> bool {
    let stale = store
        .get(key)
        .is_some_and(|entry| entry.is_expired_at(now));
    if !stale {
        return false;
    }

    if let Some(entry) = store.remove(key) {
        record_eviction(&entry.key, entry.size_bytes, EvictionCause::TtlExpired, metrics);
    }
    true
}

/// Removes every entry that is stale at `now`.
///
/// Walks the whole store; intended for the periodic sweep, not the hot path.
pub fn expire_all_stale<V>(store: &mut LruStore<V>, now: Instant, metrics: &mut CacheMetrics) -> usize {
    let stale: Vec<String> = store
        .iter()
        .filter(|entry| entry.is_expired_at(now))
        .map(|entry| entry.key.clone())
        .collect();

    stale
        .iter()
        .filter(|key| expire_if_stale(store, key, now, metrics))
        .count()
}

fn evict_lru<V>(store: &mut LruStore<V>, cause: EvictionCause, metrics: &mut CacheMetrics) -> bool {
    match store.pop_lru() {
        Some(entry) => {
            record_eviction(&entry.key, entry.size_bytes, cause, metrics);
            true
        }
        None => false,
    }
}

fn record_eviction(key: &str, size_bytes: usize, cause: EvictionCause, metrics: &mut CacheMetrics) {
    debug!(key, size_bytes, %cause, "evicted cache entry");
    metrics.record(CacheEvent::Eviction(cause));
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use std::time::Duration;

    fn fill(store: &mut LruStore<()>, now: Instant, sizes: &[(&str, usize)]) {
        for (key, size) in sizes {
            store.put(CacheEntry::new(
                key.to_string(),
                (),
                *size,
                now,
                Duration::from_millis(100),
            ));
        }
    }

    #[test]
    fn test_admission() {
        let policy = EvictionPolicy::new(10, 100);
        assert!(policy.admits(0));
        assert!(policy.admits(100));
        assert!(!policy.admits(101));

        let unbounded = EvictionPolicy::new(10, 0);
        assert!(unbounded.admits(usize::MAX));
    }

    #[test]
    fn test_make_room_evicts_lru_until_fit() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("a", 40), ("b", 30), ("c", 20)]);

        let policy = EvictionPolicy::new(10, 100);
        let evicted = policy.make_room(&mut store, 50, &mut metrics);

        // 90 + 50 > 100 -> drop a (40) -> 50 + 50 fits
        assert_eq!(evicted, 1);
        assert!(!store.contains_key("a"));
        assert_eq!(store.total_bytes(), 50);
        assert_eq!(metrics.evictions().memory_pressure, 1);
    }

    #[test]
    fn test_make_room_can_empty_store() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("a", 10), ("b", 10)]);

        let policy = EvictionPolicy::new(10, 100);
        assert_eq!(policy.make_room(&mut store, 100, &mut metrics), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_make_room_noop_when_unbounded() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("a", 1_000)]);

        let policy = EvictionPolicy::new(10, 0);
        assert_eq!(policy.make_room(&mut store, 1_000_000, &mut metrics), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_enforce_size_limit() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("a", 1), ("b", 1), ("c", 1), ("d", 1)]);

        let policy = EvictionPolicy::new(2, 0);
        assert_eq!(policy.enforce_size_limit(&mut store, &mut metrics), 2);
        assert_eq!(store.least_recently_used(), Some("c"));
        assert_eq!(metrics.evictions().size_limit, 2);
    }

    #[test]
    fn test_expire_if_stale() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("a", 5)]);

        assert!(!expire_if_stale(&mut store, "a", now + Duration::from_millis(50), &mut metrics));
        assert!(store.contains_key("a"));

        assert!(expire_if_stale(&mut store, "a", now + Duration::from_millis(100), &mut metrics));
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(metrics.evictions().ttl_expired, 1);

        assert!(!expire_if_stale(&mut store, "missing", now, &mut metrics));
    }

    #[test]
    fn test_expire_all_stale() {
        let now = Instant::now();
        let mut store = LruStore::new();
        let mut metrics = CacheMetrics::new();
        fill(&mut store, now, &[("old1", 1), ("old2", 1)]);
        fill(
            &mut store,
            now + Duration::from_millis(80),
            &[("fresh", 1)],
        );

        let removed = expire_all_stale(&mut store, now + Duration::from_millis(120), &mut metrics);

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("fresh"));
        assert_eq!(metrics.evictions().ttl_expired, 2);
    }
}
