//! Cache Module
//!
//! Memory-bounded LRU caching with TTL expiry for upstream API responses.

mod clock;
mod entry;
mod eviction;
mod key;
mod lru;
mod shared;
mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, MAX_TTL};
pub use eviction::EvictionPolicy;
pub use key::request_key;
pub use lru::LruStore;
pub use shared::SharedCache;
pub use size::{
    estimate, mapping, sequence, text, EstimateSize, Opaque, BOOL_BYTES, ELEMENT_OVERHEAD_BYTES,
    MAX_ESTIMATE_DEPTH, NUMBER_BYTES, REFERENCE_BYTES,
};
pub use stats::{
    CacheEvent, CacheMetrics, EvictionCause, EvictionCounts, MetricsSnapshot, Occupancy,
};
pub use store::{CacheStore, SetOutcome};
