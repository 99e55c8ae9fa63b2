//! Cache Metrics Module
//!
//! Counts hits, misses, evictions by cause and oversized rejections, and
//! produces point-in-time snapshots combined with live occupancy figures.

use std::fmt;

use serde::Serialize;

// == Eviction Cause ==
/// Why an entry was removed without being asked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionCause {
    /// Item-count bound exceeded
    SizeLimit,
    /// Memory bound would have been exceeded
    MemoryPressure,
    /// Entry found stale on access or by the sweep
    TtlExpired,
}

impl fmt::Display for EvictionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionCause::SizeLimit => "size-limit",
            EvictionCause::MemoryPressure => "memory-pressure",
            EvictionCause::TtlExpired => "ttl-expired",
        };
        f.write_str(name)
    }
}

// == Cache Event ==
/// Outcome observed by the metrics collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Miss,
    Eviction(EvictionCause),
    OversizedRejection,
}

// == Eviction Counts ==
/// Eviction counters split by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvictionCounts {
    pub size_limit: u64,
    pub memory_pressure: u64,
    pub ttl_expired: u64,
}

impl EvictionCounts {
    /// Evictions across every cause.
    pub fn total(&self) -> u64 {
        self.size_limit + self.memory_pressure + self.ttl_expired
    }

    /// Evictions for a single cause.
    pub fn for_cause(&self, cause: EvictionCause) -> u64 {
        match cause {
            EvictionCause::SizeLimit => self.size_limit,
            EvictionCause::MemoryPressure => self.memory_pressure,
            EvictionCause::TtlExpired => self.ttl_expired,
        }
    }

    fn increment(&mut self, cause: EvictionCause) {
        match cause {
            EvictionCause::SizeLimit => self.size_limit += 1,
            EvictionCause::MemoryPressure => self.memory_pressure += 1,
            EvictionCause::TtlExpired => self.ttl_expired += 1,
        }
    }
}

// == Cache Metrics ==
/// Monotonic counters owned by a cache instance.
///
/// Counters are never reset, including by `clear`.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: u64,
    misses: u64,
    evictions: EvictionCounts,
    oversized_rejections: u64,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Counts one event.
    pub fn record(&mut self, event: CacheEvent) {
        match event {
            CacheEvent::Hit => self.hits += 1,
            CacheEvent::Miss => self.misses += 1,
            CacheEvent::Eviction(cause) => self.evictions.increment(cause),
            CacheEvent::OversizedRejection => self.oversized_rejections += 1,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> EvictionCounts {
        self.evictions
    }

    // == Snapshot ==
    /// Combines the counters with live occupancy figures.
    ///
    /// The warning flag is derived from the figures passed in, never latched.
    pub fn snapshot(&self, occupancy: Occupancy) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions.total(),
            evictions_by_cause: self.evictions,
            oversized_rejections: self.oversized_rejections,
            current_memory_usage: occupancy.memory_bytes,
            current_item_count: occupancy.item_count,
            max_memory_bytes: occupancy.max_memory_bytes,
            warning_active: occupancy.warning_active(),
            hit_rate: hit_rate(self.hits, self.misses),
        }
    }
}

// == Occupancy ==
/// Live state of a cache at the moment a snapshot is taken.
#[derive(Debug, Clone, Copy)]
pub struct Occupancy {
    pub memory_bytes: usize,
    pub item_count: usize,
    pub max_memory_bytes: usize,
    pub warning_threshold: f64,
}

impl Occupancy {
    /// True when usage has reached the warning fraction of an enabled bound.
    ///
    /// Compares the usage ratio, which rounds exactly onto the threshold at
    /// the boundary; a scaled bound such as `0.07 * 100.0` does not.
    pub fn warning_active(&self) -> bool {
        self.max_memory_bytes > 0
            && self.memory_bytes as f64 / self.max_memory_bytes as f64 >= self.warning_threshold
    }
}

// == Metrics Snapshot ==
/// Point-in-time view of a cache's metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Evictions across every cause
    pub evictions: u64,
    pub evictions_by_cause: EvictionCounts,
    /// Values refused for exceeding the memory bound on their own
    pub oversized_rejections: u64,
    /// Sum of live entry estimates in bytes
    pub current_memory_usage: usize,
    pub current_item_count: usize,
    /// Configured memory bound; 0 when disabled
    pub max_memory_bytes: usize,
    pub warning_active: bool,
    /// hits / (hits + misses), 0.0 before any lookup
    pub hit_rate: f64,
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
