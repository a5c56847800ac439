//! Cache Statistics Module
//!
//! Tracks lookup outcomes and store mutations.

use serde::Serialize;

// == Cache Stats ==
/// Counters for one cache store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from a fresh entry
    pub hits: u64,
    /// Lookups that found no entry or a stale one
    pub misses: u64,
    /// Payloads committed by handlers
    pub commits: u64,
    /// Entries removed through `clear` or the sweep task
    pub removals: u64,
    /// Current number of resident entries (fresh or stale)
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_commit(&mut self) {
        self.commits += 1;
    }

    pub fn record_removals(&mut self, count: usize) {
        self.removals += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
