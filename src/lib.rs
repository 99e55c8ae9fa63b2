//! Response Cache - memory-bounded LRU caching for rate-limited upstream APIs
//!
//! Stores upstream responses under request-derived keys, bounding both the
//! number of entries and their estimated memory footprint, and expiring
//! entries after a TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, SetOutcome, SharedCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
