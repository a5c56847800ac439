//! In-Flight Tracking
//!
//! Per-key markers that let concurrent misses wait for one handler run
//! instead of each recomputing the same response.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::cache::CacheKey;

type Slots = Arc<Mutex<HashMap<CacheKey, watch::Receiver<()>>>>;

/// Registry of keys whose handler is currently running.
#[derive(Clone, Default)]
pub(crate) struct InFlight {
    slots: Slots,
}

/// Result of announcing a miss.
pub(crate) enum Role {
    /// First miss for the key; runs the handler while holding the guard
    Leader(InFlightGuard),
    /// Another request is computing the key; wait for it to finish
    Follower(watch::Receiver<()>),
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers the caller as leader for `key`, or returns a receiver that
    /// resolves once the current leader finishes.
    pub(crate) fn join(&self, key: &CacheKey) -> Role {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(done) = slots.get(key) {
            return Role::Follower(done.clone());
        }

        let (tx, rx) = watch::channel(());
        slots.insert(key.clone(), rx);
        Role::Leader(InFlightGuard {
            key: key.clone(),
            slots: self.slots.clone(),
            _done: tx,
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Waits until the leader's guard is dropped, or `timeout` elapses.
///
/// Returns false on timeout.
pub(crate) async fn wait_for_leader(mut done: watch::Receiver<()>, timeout: Duration) -> bool {
    // The leader never sends; `changed` resolves with an error once the sender drops.
    tokio::time::timeout(timeout, done.changed()).await.is_ok()
}

/// Held by the leader for the duration of its handler run.
///
/// Dropping it (normal completion, panic, or cancellation) removes the marker
/// and then wakes every follower.
pub(crate) struct InFlightGuard {
    key: CacheKey,
    slots: Slots,
    _done: watch::Sender<()>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&self.key);
    }
}
