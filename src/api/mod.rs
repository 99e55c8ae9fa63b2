//! API Module
//!
//! HTTP handlers and routing for the cache service.
//!
//! # Endpoints
//! - `PUT /entries` - Store a JSON value
//! - `DELETE /entries` - Drop every entry
//! - `GET /entries/:key` - Retrieve a value by key
//! - `DELETE /entries/:key` - Delete a key
//! - `GET /metrics` - Get cache metrics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
