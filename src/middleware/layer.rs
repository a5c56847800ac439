//! Request Cache Middleware
//!
//! The cache instance handed to the router and the interceptor that serves
//! fresh entries or hands a [`CacheCommit`] to the next handler.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::commit::CacheCommit;
use super::in_flight::{wait_for_leader, InFlight, InFlightGuard, Role};
use crate::cache::{CacheKey, CacheStats, CacheStore, Lookup};
use crate::config::CacheConfig;
use crate::tasks::{spawn_dump_task, spawn_sweep_task};

// == Request Cache ==
/// One cache instance: its store, its options, and its invalidation surface.
///
/// Cloning is cheap and every clone shares the same store. Separate calls to
/// [`RequestCache::new`] never share state.
#[derive(Clone)]
pub struct RequestCache {
    store: Arc<RwLock<CacheStore>>,
    config: Arc<CacheConfig>,
    in_flight: InFlight,
}

impl RequestCache {
    // == Constructor ==
    /// Creates an independent cache with its own empty store.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(config.delay_ms))),
            config: Arc::new(config),
            in_flight: InFlight::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Starts the verbose dump and stale-entry sweep tasks this config asks for.
    ///
    /// Must be called from within a tokio runtime. Abort the returned handles
    /// on shutdown.
    pub fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if self.config.debug.is_verbose() {
            handles.push(spawn_dump_task(
                self.store.clone(),
                self.config.dump_interval_ms,
            ));
        }
        if let Some(interval_ms) = self.config.sweep_interval_ms {
            handles.push(spawn_sweep_task(self.store.clone(), interval_ms));
        }
        handles
    }

    // == Lookup ==
    /// Evaluates freshness of `key` right now.
    pub async fn lookup(&self, key: &CacheKey) -> Lookup {
        let mut store = self.store.write().await;
        store.lookup(key.as_str())
    }

    /// Builds the commit capability for a request that missed on `key`.
    pub fn commit_handle(&self, key: CacheKey) -> CacheCommit {
        CacheCommit::new(key, self.store.clone(), self.config.debug)
    }

    // == Clear ==
    /// Removes the entry for `key`, or every entry when `key` is `None`.
    ///
    /// Clearing an absent key is a no-op. Returns the number of entries removed.
    pub async fn clear(&self, key: Option<&str>) -> usize {
        let removed = {
            let mut store = self.store.write().await;
            store.clear(key)
        };

        if self.config.debug.is_enabled() {
            debug!(key = key.unwrap_or("*"), removed, "cleared cache");
        }
        removed
    }

    pub async fn clear_key(&self, key: &str) -> usize {
        self.clear(Some(key)).await
    }

    pub async fn clear_all(&self) -> usize {
        self.clear(None).await
    }

    // == Diagnostics ==
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// The whole map as a JSON object keyed by cache key.
    pub async fn snapshot(&self) -> Value {
        self.store.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    fn serve_hit(&self, key: &CacheKey, payload: Value) -> Response {
        if self.config.debug.is_enabled() {
            debug!(key = %key, "fetched from cache");
        }
        Json(payload).into_response()
    }

    /// Resolves a request under coalescing: joins or waits on the in-flight
    /// leader for `key`, then records a single hit or miss.
    async fn coalesce(&self, key: &CacheKey) -> Coalesced {
        let fresh = self.store.read().await.evaluate(key.as_str()).is_hit();
        let guard = if fresh {
            None
        } else {
            match self.in_flight.join(key) {
                Role::Leader(guard) => Some(guard),
                Role::Follower(done) => {
                    let timeout = Duration::from_millis(self.config.coalesce_timeout_ms);
                    if !wait_for_leader(done, timeout).await {
                        info!(key = %key, "gave up waiting on in-flight request");
                    }
                    None
                }
            }
        };
        self.settle(key, guard).await
    }

    /// Final lookup for a coalesced request. A new leader re-checks here too,
    /// since a previous leader may have committed just before it joined.
    async fn settle(&self, key: &CacheKey, guard: Option<InFlightGuard>) -> Coalesced {
        match self.lookup(key).await.into_payload() {
            Some(payload) => Coalesced::Served(payload),
            None => Coalesced::Run(guard),
        }
    }
}

/// Outcome of a coalesced request.
enum Coalesced {
    /// A fresh payload was found, possibly committed by the leader just awaited
    Served(Value),
    /// Run the handler, holding the guard when this request leads
    Run(Option<InFlightGuard>),
}

impl std::fmt::Debug for RequestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Cache key for an inbound request, using the URI the client sent even when
/// the route is nested.
pub fn request_key(request: &Request) -> CacheKey {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());
    CacheKey::from_parts(request.method(), uri)
}

// == Middleware ==
/// Serves fresh entries and hands a [`CacheCommit`] to the handler on a miss.
///
/// Install with `axum::middleware::from_fn_with_state(cache, request_cache_middleware)`.
pub async fn request_cache_middleware(
    State(cache): State<RequestCache>,
    mut request: Request,
    next: Next,
) -> Response {
    let key = request_key(&request);

    // Held until the handler finishes so followers wake after its commit
    let _leader = if cache.config().coalesce {
        match cache.coalesce(&key).await {
            Coalesced::Served(payload) => return cache.serve_hit(&key, payload),
            Coalesced::Run(guard) => guard,
        }
    } else {
        if let Some(payload) = cache.lookup(&key).await.into_payload() {
            return cache.serve_hit(&key, payload);
        }
        None
    };

    request.extensions_mut().insert(cache.commit_handle(key));
    next.run(request).await
}
