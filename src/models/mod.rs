//! Request and Response models for the demo and admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ClearParams;
pub use responses::{CakeMessage, ClearResponse, ErrorResponse, HealthResponse, StatsResponse};
