//! Cache Module
//!
//! Request-keyed response storage with lazy TTL expiration.

mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
