//! Error types for the request cache
//!
//! Provides unified error handling using thiserror. Lookups and clears have no
//! failure mode; errors only arise from payload serialization, configuration
//! parsing and handler wiring.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the request cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Committed payload could not be converted to JSON
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unrecognized configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `CacheCommit` requested on a route the cache middleware does not wrap
    #[error("Request cache middleware is not installed on this route")]
    MissingLayer,
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) | CacheError::MissingLayer => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the request cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_layer_is_server_error() {
        let response = CacheError::MissingLayer.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_config_is_bad_request() {
        let response = CacheError::InvalidConfig("debug".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_serialization_error_from() {
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err: CacheError = err.into();
        assert!(err.to_string().starts_with("Payload serialization failed"));
    }
}
