//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Request body for the SET operation (PUT /entries)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON payload, typically an upstream response body
/// - `ttl_ms`: Optional TTL in milliseconds (uses the cache default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be greater than zero".to_string());
        }
        None
    }

    /// TTL override requested by the caller, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}
