//! Request Cache - TTL response caching middleware for axum
//!
//! Handlers opt in to caching by committing their payload through a
//! [`CacheCommit`]; repeat requests with the same method and URL inside the
//! configured delay are answered from the store without reaching the handler.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheKey, CacheStats, Lookup};
pub use config::{CacheConfig, DebugMode, ServerConfig};
pub use error::{CacheError, Result};
pub use middleware::{request_cache_middleware, CacheCommit, RequestCache};
