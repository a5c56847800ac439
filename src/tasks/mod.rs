//! Background Tasks Module
//!
//! Periodic tasks a cache instance may run alongside request handling.
//!
//! # Tasks
//! - Verbose dump: logs the full map at a fixed interval
//! - Sweep: removes stale entries at a fixed interval

mod dump;
mod sweep;

pub use dump::spawn_dump_task;
pub use sweep::spawn_sweep_task;
