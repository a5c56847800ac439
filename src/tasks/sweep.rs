//! Stale Entry Sweep Task
//!
//! Optional background task that removes entries whose freshness window has
//! elapsed. Lookups never depend on it: staleness is always re-checked on read.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a task that removes stale entries every `interval_ms` milliseconds.
///
/// Returns a JoinHandle that can be used to abort the task during graceful
/// shutdown.
pub fn spawn_sweep_task(store: Arc<RwLock<CacheStore>>, interval_ms: u64) -> JoinHandle<()> {
    let interval = Duration::from_millis(interval_ms.max(1));

    tokio::spawn(async move {
        info!("Starting stale entry sweep with interval of {}ms", interval_ms);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.sweep_stale()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} stale entries", removed);
            } else {
                debug!("Cache sweep: no stale entries found");
            }
        }
    })
}
