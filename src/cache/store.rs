//! Cache Store Module
//!
//! Request-keyed payload map with lazy, read-time expiration.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats};

// == Lookup ==
/// Outcome of a read against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Entry exists and was committed less than `delay` ago
    Fresh(Value),
    /// Entry is resident but its freshness window has elapsed
    Stale,
    /// No entry was ever committed for the key (or it was cleared)
    Absent,
}

impl Lookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    /// Returns the payload for a hit.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Lookup::Fresh(payload) => Some(payload),
            Lookup::Stale | Lookup::Absent => None,
        }
    }
}

// == Cache Store ==
/// Response cache keyed by `"{METHOD} {path?query}"`.
///
/// Entries are only created by [`CacheStore::commit`]. Stale entries are never
/// purged on read; they stay resident until overwritten, cleared, or swept.
#[derive(Debug)]
pub struct CacheStore {
    /// Key to committed payload
    entries: HashMap<String, CacheEntry>,
    /// Freshness window in milliseconds
    delay_ms: u64,
    /// Lookup and mutation counters
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with the given freshness window.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            delay_ms,
            stats: CacheStats::new(),
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    // == Lookup ==
    /// Looks up a key against the current time and records a hit or miss.
    pub fn lookup(&mut self, key: &str) -> Lookup {
        self.lookup_at(key, current_timestamp_ms())
    }

    /// Looks up a key as of `now` (Unix milliseconds).
    pub fn lookup_at(&mut self, key: &str, now: u64) -> Lookup {
        let outcome = self.evaluate_at(key, now);
        self.record_outcome(&outcome);
        outcome
    }

    /// Evaluates freshness of `key` as of `now` without counting a hit or miss.
    pub fn evaluate_at(&self, key: &str, now: u64) -> Lookup {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh_at(now, self.delay_ms) => {
                Lookup::Fresh(entry.payload.clone())
            }
            Some(_) => Lookup::Stale,
            None => Lookup::Absent,
        }
    }

    pub fn evaluate(&self, key: &str) -> Lookup {
        self.evaluate_at(key, current_timestamp_ms())
    }

    /// Counts one request's final outcome as a hit or a miss.
    pub fn record_outcome(&mut self, outcome: &Lookup) {
        if outcome.is_hit() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
    }

    /// Reads an entry without evaluating freshness or touching statistics.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Commit ==
    /// Stores a payload under `key`, stamped with the current time.
    ///
    /// Returns the recorded commit timestamp.
    pub fn commit(&mut self, key: impl Into<String>, payload: Value) -> u64 {
        self.commit_at(key, payload, current_timestamp_ms())
    }

    /// Stores a payload under `key`, stamped with `now`.
    ///
    /// The stored timestamp never moves backwards for a key, even if the
    /// wall clock does.
    pub fn commit_at(&mut self, key: impl Into<String>, payload: Value, now: u64) -> u64 {
        let key = key.into();
        let last_update = match self.entries.get(&key) {
            Some(previous) => now.max(previous.last_update),
            None => now,
        };

        self.entries.insert(key, CacheEntry::at(payload, last_update));
        self.stats.record_commit();
        self.stats.set_total_entries(self.entries.len());
        last_update
    }

    // == Clear ==
    /// Removes one entry when `key` is given, or every entry otherwise.
    ///
    /// Clearing an absent key is a no-op. Returns the number of entries removed.
    pub fn clear(&mut self, key: Option<&str>) -> usize {
        let removed = match key {
            Some(key) => usize::from(self.entries.remove(key).is_some()),
            None => {
                let count = self.entries.len();
                self.entries.clear();
                count
            }
        };

        self.stats.record_removals(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Sweep ==
    /// Removes every entry that is no longer fresh.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_stale(&mut self) -> usize {
        self.sweep_stale_at(current_timestamp_ms())
    }

    /// Removes every entry that is no longer fresh as of `now`.
    pub fn sweep_stale_at(&mut self, now: u64) -> usize {
        let delay_ms = self.delay_ms;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now, delay_ms));

        let removed = before - self.entries.len();
        self.stats.record_removals(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Snapshot ==
    /// Returns the whole map as a JSON object keyed by cache key.
    pub fn snapshot(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let value = serde_json::to_value(entry).unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect();
        Value::Object(map)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
