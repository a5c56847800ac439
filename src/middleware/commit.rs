//! Commit Capability
//!
//! The per-request handle a downstream handler uses to cache its response.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheKey, CacheStore};
use crate::config::DebugMode;
use crate::error::{CacheError, Result};

// == Cache Commit ==
/// Stores a handler's payload under the key of the request that missed.
///
/// Inserted into the request extensions by the cache middleware on every
/// miss. Handlers extract it directly, or as `Option<CacheCommit>` when the
/// route may run without the middleware.
#[derive(Clone)]
pub struct CacheCommit {
    key: CacheKey,
    store: Arc<RwLock<CacheStore>>,
    debug: DebugMode,
}

impl CacheCommit {
    pub(crate) fn new(key: CacheKey, store: Arc<RwLock<CacheStore>>, debug: DebugMode) -> Self {
        Self { key, store, debug }
    }

    /// Key this handle commits under.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Serializes `payload` and stores it, stamped with the current time.
    ///
    /// The entry is visible to every lookup that starts after this returns.
    /// Committing again overwrites the previous payload.
    pub async fn commit<T>(&self, payload: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(payload)?;
        let logged = self.debug.is_enabled().then(|| value.to_string());

        {
            let mut store = self.store.write().await;
            store.commit(self.key.as_str(), value);
        }

        if let Some(payload) = logged {
            debug!(key = %self.key, payload = %payload, "set cache");
        }
        Ok(())
    }
}

impl std::fmt::Debug for CacheCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCommit")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CacheCommit
where
    S: Send + Sync,
{
    type Rejection = CacheError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CacheCommit>()
            .cloned()
            .ok_or(CacheError::MissingLayer)
    }
}
