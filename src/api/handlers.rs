//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{MetricsSnapshot, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// Owns the service's single cache instance; the cache handle does its own
/// locking, so the state is cheap to clone into each request.
#[derive(Clone)]
pub struct AppState {
    /// Cache of upstream JSON responses
    pub cache: SharedCache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: SharedCache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the cache configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = SharedCache::new(config.cache.clone())?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /entries
///
/// Stores a JSON value with optional TTL. Oversized values are reported in
/// the body rather than as an error.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let outcome = state.cache.set(req.key.clone(), req.value, ttl);

    Ok(Json(SetResponse::new(req.key, outcome.is_stored())))
}

/// Handler for GET /entries/:key
///
/// Retrieves a live value by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /entries/:key
///
/// Deletes a key from the cache.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /entries
///
/// Drops every entry; cumulative metrics are kept.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.clear();
    Json(ClearResponse { removed })
}

/// Handler for GET /metrics
///
/// Returns current cache metrics.
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.cache.metrics())
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
