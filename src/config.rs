//! Configuration Module
//!
//! Cache bounds and service settings, loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default maximum number of cached entries
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default memory bound (50 MiB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 50 * 1024 * 1024;

/// Default fraction of the memory bound at which the warning becomes active
pub const DEFAULT_MEMORY_WARNING_THRESHOLD: f64 = 0.8;

// == Cache Config ==
/// Bounds applied by a single cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of live entries (must be at least 1)
    pub max_size: usize,
    /// Lifetime applied to entries stored without an override
    pub ttl: Duration,
    /// Upper bound on the summed entry estimates; 0 disables the bound
    pub max_memory_bytes: usize,
    /// Fraction of `max_memory_bytes` at which `warning_active` turns on
    pub memory_warning_threshold: f64,
}

impl CacheConfig {
    // == Validate ==
    /// Rejects configurations the cache cannot honour.
    ///
    /// Called by every cache constructor so misconfiguration fails at
    /// startup instead of at first use.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfiguration(
                "max_size must be at least 1".to_string(),
            ));
        }

        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "ttl must be greater than zero".to_string(),
            ));
        }

        let threshold = self.memory_warning_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CacheError::InvalidConfiguration(format!(
                "memory_warning_threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        Ok(())
    }

    /// Returns true when the memory bound is enforced.
    pub fn memory_bound_enabled(&self) -> bool {
        self.max_memory_bytes > 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            memory_warning_threshold: DEFAULT_MEMORY_WARNING_THRESHOLD,
        }
    }
}

// == Service Config ==
/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bounds for the shared cache instance
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Interval between background expiry sweeps in milliseconds; 0 disables the sweep
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_MEMORY_BYTES` - Memory bound, 0 disables (default: 52428800)
    /// - `CACHE_MEMORY_WARNING_THRESHOLD` - Warning fraction (default: 0.8)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_MS` - Expiry sweep frequency, 0 disables (default: 1000)
    ///
    /// Unparseable values fall back to their defaults; range checks happen in
    /// [`Config::validate`].
    pub fn from_env() -> Self {
        let ttl_ms = env_or("CACHE_TTL_MS", DEFAULT_TTL.as_millis() as u64);

        Self {
            cache: CacheConfig {
                max_size: env_or("CACHE_MAX_SIZE", DEFAULT_MAX_SIZE),
                ttl: Duration::from_millis(ttl_ms),
                max_memory_bytes: env_or("CACHE_MAX_MEMORY_BYTES", DEFAULT_MAX_MEMORY_BYTES),
                memory_warning_threshold: env_or(
                    "CACHE_MEMORY_WARNING_THRESHOLD",
                    DEFAULT_MEMORY_WARNING_THRESHOLD,
                ),
            },
            server_port: env_or("SERVER_PORT", 3000),
            sweep_interval_ms: env_or("SWEEP_INTERVAL_MS", 1000),
        }
    }

    /// Validates the embedded cache configuration.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()
    }

    /// Returns the sweep interval, or None when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_ms > 0).then(|| Duration::from_millis(self.sweep_interval_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            sweep_interval_ms: 1000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
