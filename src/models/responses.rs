//! Response DTOs for the demo and admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// Payload of the demo endpoint (GET /)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CakeMessage {
    pub cake: String,
    /// Unix milliseconds at which the payload was computed
    pub timestamp: u64,
}

impl CakeMessage {
    pub fn new(timestamp: u64) -> Self {
        Self {
            cake: "isGood".to_string(),
            timestamp,
        }
    }
}

/// Response body for the clear operation (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// The key that was cleared, absent for a full clear
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Number of entries removed
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(key: Option<String>, removed: usize) -> Self {
        let message = match &key {
            Some(key) => format!("Key '{}' cleared", key),
            None => "Cache cleared".to_string(),
        };
        Self {
            message,
            key,
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that reached the handler
    pub misses: u64,
    /// Payloads committed by handlers
    pub commits: u64,
    /// Entries removed by clear or sweep
    pub removals: u64,
    /// Resident entries, fresh or stale
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            commits: stats.commits,
            removals: stats.removals,
            total_entries: stats.total_entries,
        }
    }
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

/// Error response body, mirroring what `CacheError` renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
