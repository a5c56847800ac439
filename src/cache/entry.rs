//! Cache Entry Module
//!
//! Defines a committed response payload and the freshness check applied to it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// A response payload committed by a downstream handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// The committed response body
    pub payload: Value,
    /// Commit timestamp (Unix milliseconds)
    pub last_update: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(payload: Value) -> Self {
        Self::at(payload, current_timestamp_ms())
    }

    /// Creates a new entry stamped with an explicit commit time.
    pub fn at(payload: Value, last_update: u64) -> Self {
        Self {
            payload,
            last_update,
        }
    }

    // == Freshness ==
    /// Returns true while `now - last_update < delay_ms`.
    ///
    /// A delay of zero is never fresh. A clock that moved backwards since the
    /// commit counts as zero elapsed time.
    pub fn is_fresh_at(&self, now: u64, delay_ms: u64) -> bool {
        self.age_at(now) < delay_ms
    }

    /// Checks freshness against the current time.
    pub fn is_fresh(&self, delay_ms: u64) -> bool {
        self.is_fresh_at(current_timestamp_ms(), delay_ms)
    }

    /// Milliseconds elapsed since the commit.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_update)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
