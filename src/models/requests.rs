//! Request DTOs for the admin API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query parameters for `DELETE /cache`
///
/// Without `key` the whole cache is cleared. Keys are full cache keys such as
/// `GET /my/endpoint/B?n=2`, so they must be percent-encoded in the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearParams {
    /// Cache key to remove
    #[serde(default)]
    pub key: Option<String>,
}

impl ClearParams {
    pub fn target(&self) -> Option<&str> {
        self.key.as_deref()
    }
}
