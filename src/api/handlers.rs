//! API Handlers
//!
//! The cached demo endpoint and the administrative cache endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::current_timestamp_ms;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::middleware::{CacheCommit, RequestCache};
use crate::models::{CakeMessage, ClearParams, ClearResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Cache installed in front of the demo routes
    pub cache: RequestCache,
}

impl AppState {
    pub fn new(cache: RequestCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh cache built from `config`.
    pub fn from_config(config: CacheConfig) -> Self {
        Self::new(RequestCache::new(config))
    }
}

/// Handler for GET /
///
/// Computes a timestamped payload and commits it, so repeat requests inside
/// the freshness window get the same timestamp back.
pub async fn cake_handler(commit: CacheCommit) -> Result<Json<CakeMessage>> {
    let msg = CakeMessage::new(current_timestamp_ms());
    commit.commit(&msg).await?;
    Ok(Json(msg))
}

/// Handler for DELETE /cache
///
/// Clears one key when `?key=` is given, otherwise the whole cache.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Json<ClearResponse> {
    let removed = state.cache.clear(params.target()).await;
    Json(ClearResponse::new(params.key, removed))
}

/// Handler for GET /cache
///
/// Returns every resident entry, fresh or stale.
pub async fn snapshot_handler(State(state): State<AppState>) -> Json<Value> {
    Json(state.cache.snapshot().await)
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
