//! Cache Key Module
//!
//! Derives the cache key identifying one cacheable request shape.

use std::fmt;

use axum::http::{Method, Uri};

// == Cache Key ==
/// `"{METHOD} {path?query}"`, e.g. `GET /my/endpoint/B?n=2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key from a request method and its full URI.
    ///
    /// Scheme and authority are ignored; the query string is kept so that
    /// distinct queries map to distinct entries.
    pub fn from_parts(method: &Method, uri: &Uri) -> Self {
        let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        Self(format!("{} {}", method, target))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
