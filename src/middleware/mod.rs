//! Middleware Module
//!
//! Wires the cache store into an axum router.
//!
//! ```ignore
//! let cache = RequestCache::new(CacheConfig::new(1000));
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn_with_state(cache.clone(), request_cache_middleware));
//!
//! async fn handler(commit: CacheCommit) -> Result<Json<u64>> {
//!     let now = current_timestamp_ms();
//!     commit.commit(&now).await?;
//!     Ok(Json(now))
//! }
//! ```

mod commit;
mod in_flight;
mod layer;

pub use commit::CacheCommit;
pub use layer::{request_cache_middleware, request_key, RequestCache};
