//! Data Transfer Objects
//!
//! Response types for the HTTP endpoints, serialized to JSON.

use serde::Serialize;

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"; an unreachable hub answers 503 instead
    pub status: String,
    /// Currently registered connections
    pub connections: usize,
    /// Connections ever registered
    pub registered: u64,
    /// Connections that left on their own
    pub unregistered: u64,
    /// Connections dropped for not keeping up
    pub dropped: u64,
    /// Messages received for fan-out
    pub messages: u64,
    /// Per-connection deliveries that succeeded
    pub delivered: u64,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}
