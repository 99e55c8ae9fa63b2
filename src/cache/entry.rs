//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

/// Longest lifetime an entry can be given; longer TTLs are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A stored value together with its accounting metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// When the entry was written
    pub inserted_at: Instant,
    /// First instant at which the entry is considered stale
    pub expires_at: Instant,
    /// Estimated footprint, fixed at insertion
    pub size_bytes: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now` that lives for `ttl`.
    pub fn new(key: String, value: V, size_bytes: usize, now: Instant, ttl: Duration) -> Self {
        Self {
            key,
            value,
            inserted_at: now,
            expires_at: now + ttl.min(MAX_TTL),
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// lookup exactly at the deadline is already a miss.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime at `now`; zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
