//! API Module
//!
//! Demo and administrative HTTP surface around one request cache.
//!
//! # Endpoints
//! - `GET /` - Cached demo payload
//! - `GET /cache` - Dump resident entries
//! - `DELETE /cache` - Clear all entries, or one with `?key=`
//! - `GET /cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
