//! Scenario Tests for the Request Cache Middleware
//!
//! Runs the middleware in front of real handlers, over a live socket for the
//! timing scenarios and through `oneshot` for the concurrency ones.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use request_cache::{request_cache_middleware, CacheCommit, CacheConfig, DebugMode, RequestCache};
use serde_json::Value;
use tower::ServiceExt;

// == Test Configuration ==
const DELAY_MS: u64 = 300;
const ENDPOINT_A: &str = "/my/endpoint/A";
const ENDPOINT_B: &str = "/my/endpoint/B";

// == Helper Functions ==

/// Router whose handlers commit a strictly increasing sequence number.
fn sequence_app(cache: RequestCache, calls: Arc<AtomicU64>) -> Router {
    let handler = move |commit: CacheCommit| {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            commit.commit(&n).await?;
            Ok::<_, request_cache::CacheError>(Json(n))
        }
    };

    Router::new()
        .route(ENDPOINT_A, get(handler.clone()))
        .route(ENDPOINT_B, get(handler))
        .layer(from_fn_with_state(cache, request_cache_middleware))
}

/// Router with a handler slow enough for requests to overlap.
fn slow_app(cache: RequestCache, calls: Arc<AtomicU64>) -> Router {
    Router::new()
        .route(
            "/slow",
            get(move |commit: CacheCommit| {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    commit.commit(&n).await.unwrap();
                    Json(n)
                }
            }),
        )
        .layer(from_fn_with_state(cache, request_cache_middleware))
}

/// Coalesced route whose handler takes `work_ms` and never commits.
fn uncommitted_app(cache: RequestCache, calls: Arc<AtomicU64>, work_ms: u64) -> Router {
    Router::new()
        .route(
            "/slow",
            get(move |_commit: CacheCommit| {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    tokio::time::sleep(Duration::from_millis(work_ms)).await;
                    Json(n)
                }
            }),
        )
        .layer(from_fn_with_state(cache, request_cache_middleware))
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn fetch(client: &reqwest::Client, addr: SocketAddr, endpoint: &str) -> u64 {
    let response = client
        .get(format!("http://{}{}", addr, endpoint))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json::<u64>().await.unwrap()
}

fn unique(mut results: Vec<u64>) -> usize {
    results.sort_unstable();
    results.dedup();
    results.len()
}

async fn start(config: CacheConfig) -> (RequestCache, Arc<AtomicU64>, SocketAddr) {
    let cache = RequestCache::new(config);
    let calls = Arc::new(AtomicU64::new(0));
    let addr = spawn_server(sequence_app(cache.clone(), calls.clone())).await;
    (cache, calls, addr)
}

// == Freshness Window ==

#[tokio::test]
async fn test_rapid_requests_are_served_from_cache() {
    let (_, calls, addr) = start(CacheConfig::new(DELAY_MS).with_debug(DebugMode::On)).await;
    let client = reqwest::Client::new();

    let mut results = Vec::new();
    for _ in 0..3 {
        results.push(fetch(&client, addr, ENDPOINT_A).await);
    }

    assert_eq!(unique(results), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_requests_spaced_past_delay_are_recomputed() {
    let (cache, calls, addr) = start(CacheConfig::new(DELAY_MS)).await;
    let client = reqwest::Client::new();

    let mut results = Vec::new();
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(DELAY_MS + 100)).await;
        results.push(fetch(&client, addr, ENDPOINT_A).await);
    }

    assert_eq!(unique(results), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Overwritten in place, never duplicated
    assert_eq!(cache.len().await, 1);
}

// == Key Discrimination ==

#[tokio::test]
async fn test_query_strings_get_independent_entries() {
    let (cache, _, addr) = start(CacheConfig::new(DELAY_MS)).await;
    let client = reqwest::Client::new();

    let mut results = Vec::new();
    for n in 0..3 {
        results.push(fetch(&client, addr, &format!("{}?n={}", ENDPOINT_B, n)).await);
    }

    assert_eq!(unique(results), 3);
    let snapshot = cache.snapshot().await;
    assert!(snapshot.get("GET /my/endpoint/B?n=2").is_some());
}

#[tokio::test]
async fn test_paths_get_independent_entries() {
    let (_, _, addr) = start(CacheConfig::new(DELAY_MS)).await;
    let client = reqwest::Client::new();

    let a = fetch(&client, addr, ENDPOINT_A).await;
    let b = fetch(&client, addr, ENDPOINT_B).await;

    assert_ne!(a, b);
    assert_eq!(fetch(&client, addr, ENDPOINT_A).await, a);
}

// == Clear Semantics ==

#[tokio::test]
async fn test_clear_all_before_each_request_forces_recompute() {
    let (cache, _, addr) = start(CacheConfig::new(DELAY_MS).with_debug(DebugMode::Verbose)).await;
    let client = reqwest::Client::new();

    let mut results = Vec::new();
    for _ in 0..3 {
        cache.clear(None).await;
        results.push(fetch(&client, addr, ENDPOINT_B).await);
    }

    assert_eq!(unique(results), 3);
}

#[tokio::test]
async fn test_clear_key_leaves_other_keys_cached() {
    let (cache, _, addr) = start(CacheConfig::new(60_000)).await;
    let client = reqwest::Client::new();

    let a = fetch(&client, addr, ENDPOINT_A).await;
    let b = fetch(&client, addr, ENDPOINT_B).await;

    assert_eq!(cache.clear_key("GET /my/endpoint/A").await, 1);

    assert_ne!(fetch(&client, addr, ENDPOINT_A).await, a);
    assert_eq!(fetch(&client, addr, ENDPOINT_B).await, b);
}

// == Nested Routers ==

#[tokio::test]
async fn test_nested_routes_key_on_original_uri() {
    let cache = RequestCache::new(CacheConfig::new(60_000));
    let inner = sequence_app(cache.clone(), Arc::new(AtomicU64::new(0)));
    let app = Router::new().nest("/api", inner);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/my/endpoint/A?x=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let snapshot = cache.snapshot().await;
    assert!(snapshot.get("GET /api/my/endpoint/A?x=1").is_some());
}

// == Concurrent Misses ==

async fn fire_concurrently(app: Router, count: usize) -> Vec<Value> {
    let handles: Vec<_> = (0..count)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let response = app
                    .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                    .await
                    .unwrap();
                serde_json::from_slice::<Value>(&bytes).unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test]
async fn test_concurrent_misses_each_run_handler_by_default() {
    let cache = RequestCache::new(CacheConfig::new(60_000));
    let calls = Arc::new(AtomicU64::new(0));

    fire_concurrently(slow_app(cache.clone(), calls.clone()), 4).await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Last write wins, one resident entry
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.stats().await.commits, 4);
}

#[tokio::test]
async fn test_coalescing_shares_one_handler_run() {
    let cache = RequestCache::new(CacheConfig::new(60_000).with_coalescing(true));
    let calls = Arc::new(AtomicU64::new(0));

    let results = fire_concurrently(slow_app(cache.clone(), calls.clone()), 4).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| *r == Value::from(1u64)));

    // One outcome per request: the leader's miss and three served followers
    let stats = cache.stats().await;
    assert_eq!(stats.hits + stats.misses, 4);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);
}

#[tokio::test]
async fn test_coalesced_followers_run_handler_when_leader_skips_commit() {
    let cache = RequestCache::new(CacheConfig::new(60_000).with_coalescing(true));
    let calls = Arc::new(AtomicU64::new(0));

    let results = fire_concurrently(uncommitted_app(cache.clone(), calls.clone(), 100), 4).await;

    assert_eq!(results.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().await.misses, 4);
}

#[tokio::test]
async fn test_coalesced_followers_stop_waiting_after_timeout() {
    let mut config = CacheConfig::new(60_000).with_coalescing(true);
    config.coalesce_timeout_ms = 50;
    let cache = RequestCache::new(config);
    let calls = Arc::new(AtomicU64::new(0));

    // Every run takes 200ms, well past the followers' wait bound
    let app = slow_app(cache.clone(), calls.clone());

    let results = fire_concurrently(app, 4).await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let mut seen: Vec<u64> = results.iter().filter_map(Value::as_u64).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert_eq!(cache.stats().await.misses, 4);
}
