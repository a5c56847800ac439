//! API Routes
//!
//! Configures the demo router: cached endpoints behind the request cache
//! middleware, administrative endpoints outside it.

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cake_handler, clear_handler, health_handler, snapshot_handler, stats_handler, AppState,
};
use crate::middleware::request_cache_middleware;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Cached demo payload
/// - `GET /cache` - Dump resident entries
/// - `DELETE /cache` - Clear the cache, or one key with `?key=`
/// - `GET /cache/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cached = Router::new()
        .route("/", get(cake_handler))
        .route_layer(from_fn_with_state(
            state.cache.clone(),
            request_cache_middleware,
        ));

    Router::new()
        .merge(cached)
        .route("/cache", get(snapshot_handler).delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
