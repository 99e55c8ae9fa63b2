//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies. Metrics are
//! served directly as [`MetricsSnapshot`](crate::cache::MetricsSnapshot).

use serde::Serialize;
use serde_json::Value;

/// Response body for the GET operation (GET /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /entries)
///
/// An oversized value is not an error: the response reports `stored: false`.
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Outcome message
    pub message: String,
    /// The key that was written
    pub key: String,
    /// Whether the value is now cached
    pub stored: bool,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' cached", key)
        } else {
            format!("Key '{}' not cached: value exceeds memory bound", key)
        };
        Self {
            message,
            key,
            stored,
        }
    }
}

/// Response body for the DELETE operation (DELETE /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for the CLEAR operation (DELETE /entries)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of entries dropped
    pub removed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", json!({ "title": "Heat" }));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "test_key");
        assert_eq!(json["value"]["title"], "Heat");
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", true);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("\"stored\":true"));
    }

    #[test]
    fn test_set_response_not_stored() {
        let resp = SetResponse::new("big", false);
        assert!(!resp.stored);
        assert!(resp.message.contains("not cached"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
