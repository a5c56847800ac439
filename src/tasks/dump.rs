//! Verbose Dump Task
//!
//! Background task that periodically logs the full cache map.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that logs the whole map every `interval_ms` milliseconds.
///
/// The read lock is held only while the snapshot is taken, so writers are
/// never blocked by the logging itself.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(1000)));
/// let dump_handle = spawn_dump_task(store.clone(), 400);
/// // Later, during shutdown:
/// dump_handle.abort();
/// ```
pub fn spawn_dump_task(store: Arc<RwLock<CacheStore>>, interval_ms: u64) -> JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        info!("Starting cache dump task with interval of {}ms", interval_ms);

        loop {
            tokio::time::sleep(interval).await;

            let snapshot = {
                let store_guard = store.read().await;
                store_guard.snapshot()
            };

            debug!("cache: {}", snapshot);
        }
    })
}
