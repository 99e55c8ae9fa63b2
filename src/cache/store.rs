//! Cache Store Module
//!
//! Main cache engine combining the LRU entry store with size estimation,
//! eviction and metrics. Every method takes `&mut self` or `&self`; callers
//! sharing a store across threads go through [`SharedCache`](crate::cache::SharedCache).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::eviction::{expire_all_stale, expire_if_stale, EvictionPolicy};
use crate::cache::{
    CacheEntry, CacheEvent, CacheMetrics, Clock, EstimateSize, LruStore, MetricsSnapshot,
    Occupancy, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::Result;

// == Set Outcome ==
/// Result of a `set` call. Neither variant is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value is now cached
    Stored,
    /// The value alone exceeds the memory bound and was not cached
    RejectedOversized,
}

impl SetOutcome {
    pub fn is_stored(self) -> bool {
        self == SetOutcome::Stored
    }
}

// == Cache Store ==
/// Memory-bounded LRU cache with TTL expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Entries in recency order
    entries: LruStore<V>,
    /// Count and memory bounds
    policy: EvictionPolicy,
    /// Cumulative counters
    metrics: CacheMetrics,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    /// Set while usage sits above the warning threshold, so the crossing is logged once
    warning_logged: bool,
}

impl<V: EstimateSize + Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store reading time from the system clock.
    ///
    /// Fails with `InvalidConfiguration` if `config` does not validate.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            entries: LruStore::new(),
            policy: EvictionPolicy::from_config(&config),
            metrics: CacheMetrics::new(),
            config,
            clock,
            warning_logged: false,
        })
    }

    // == Get ==
    /// Returns a clone of the live value stored under `key`.
    ///
    /// A hit promotes the entry to most recently used. A stale entry is
    /// removed and the lookup counts as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();

        if expire_if_stale(&mut self.entries, key, now, &mut self.metrics) {
            self.metrics.record(CacheEvent::Miss);
            self.track_memory_warning();
            return None;
        }

        if !self.entries.touch(key) {
            self.metrics.record(CacheEvent::Miss);
            return None;
        }

        self.metrics.record(CacheEvent::Hit);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// The entry lives for `ttl_override` if given and non-zero, otherwise
    /// for the configured TTL; overwriting a key starts a fresh TTL window.
    /// A value whose estimate exceeds the memory bound is refused and the
    /// cache is left exactly as it was.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: V,
        ttl_override: Option<Duration>,
    ) -> SetOutcome {
        let key = key.into();
        let size_bytes = value.estimated_size();

        if !self.policy.admits(size_bytes) {
            self.metrics.record(CacheEvent::OversizedRejection);
            warn!(
                key = %key,
                size_bytes,
                max_memory_bytes = self.config.max_memory_bytes,
                "refusing to cache oversized value"
            );
            return SetOutcome::RejectedOversized;
        }

        let ttl = ttl_override
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or(self.config.ttl);
        let now = self.clock.now();

        // An overwrite supersedes the old entry; it is not an eviction.
        self.entries.remove(&key);
        self.policy.make_room(&mut self.entries, size_bytes, &mut self.metrics);
        self.entries.put(CacheEntry::new(key, value, size_bytes, now, ttl));
        self.policy.enforce_size_limit(&mut self.entries, &mut self.metrics);

        self.track_memory_warning();
        SetOutcome::Stored
    }

    // == Delete ==
    /// Removes the entry stored under `key`.
    ///
    /// Returns true only if a live entry was removed. A stale entry is
    /// still dropped, but counts as a TTL eviction and returns false.
    pub fn delete(&mut self, key: &str) -> bool {
        let now = self.clock.now();

        if expire_if_stale(&mut self.entries, key, now, &mut self.metrics) {
            return false;
        }

        let removed = self.entries.remove(key).is_some();
        if removed {
            self.track_memory_warning();
        }
        removed
    }

    // == Clear ==
    /// Drops every entry. Cumulative metrics are kept.
    ///
    /// Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.clear();
        self.warning_logged = false;
        debug!(removed, "cleared cache");
        removed
    }

    // == Purge Expired ==
    /// Removes every stale entry, counting each as a TTL eviction.
    ///
    /// Returns the number of entries removed. Lookups already ignore stale
    /// entries; this only reclaims their slots and bytes early.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let removed = expire_all_stale(&mut self.entries, now, &mut self.metrics);
        if removed > 0 {
            self.track_memory_warning();
        }
        removed
    }
}

impl<V> CacheStore<V> {
    // == Metrics ==
    /// Returns a snapshot of counters and live occupancy.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.occupancy())
    }

    /// Sum of the estimated sizes of all stored entries.
    pub fn current_memory_usage(&self) -> usize {
        self.entries.total_bytes()
    }

    /// Number of stored entries, including any not yet found stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a live entry exists for `key`. Does not affect recency or metrics.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Remaining lifetime of the live entry under `key`.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now))
    }

    /// Key that the next count or memory eviction would remove.
    pub fn peek_lru_key(&self) -> Option<&str> {
        self.entries.least_recently_used()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn entry_store(&self) -> &LruStore<V> {
        &self.entries
    }

    fn occupancy(&self) -> Occupancy {
        Occupancy {
            memory_bytes: self.entries.total_bytes(),
            item_count: self.entries.len(),
            max_memory_bytes: self.config.max_memory_bytes,
            warning_threshold: self.config.memory_warning_threshold,
        }
    }

    fn track_memory_warning(&mut self) {
        let active = self.occupancy().warning_active();
        if active && !self.warning_logged {
            warn!(
                current_memory_usage = self.entries.total_bytes(),
                max_memory_bytes = self.config.max_memory_bytes,
                threshold = self.config.memory_warning_threshold,
                "cache memory usage above warning threshold"
            );
        }
        self.warning_logged = active;
    }
}
