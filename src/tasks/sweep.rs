//! TTL Sweep Task
//!
//! Background task that periodically reclaims expired cache entries. Lookups
//! never return stale entries on their own; the sweep only frees their
//! memory and slots before something happens to touch them.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{EstimateSize, SharedCache};

/// Spawns a background task that purges expired entries every `interval`.
///
/// The returned handle should be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(CacheConfig::default())?;
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: SharedCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: EstimateSize + Clone + Send + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::CacheConfig;
    use std::sync::Arc;

    fn cache_with_clock() -> (SharedCache<String>, ManualClock) {
        let clock = ManualClock::new();
        let config = CacheConfig {
            max_size: 100,
            ttl: Duration::from_secs(1),
            max_memory_bytes: 0,
            memory_warning_threshold: 0.8,
        };
        let cache = SharedCache::with_clock(config, Arc::new(clock.clone())).unwrap();
        (cache, clock)
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let (cache, clock) = cache_with_clock();
        cache.set("expire_soon", "value".to_string(), None);
        clock.advance(Duration::from_secs(2));

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Removed without any lookup touching it
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.metrics().evictions_by_cause.ttl_expired, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let (cache, _clock) = cache_with_clock();
        cache.set("long_lived", "value".to_string(), Some(Duration::from_secs(3600)));

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get("long_lived").as_deref(), Some("value"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (cache, _clock) = cache_with_clock();

        let handle = spawn_sweep_task(cache, Duration::from_millis(20));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
