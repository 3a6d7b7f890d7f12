//! REST API models and request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw transaction payload, fields checked by [`crate::validation`]
#[derive(Debug, Default, Deserialize)]
pub struct TransactionRequest {
    /// Decimal amount, as a JSON string or number
    #[serde(default)]
    pub amount: Option<Value>,
    /// ISO-8601 instant
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Error response model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service version
    pub version: String,
    /// Service uptime in seconds
    pub uptime_seconds: u64,
    /// Second buckets currently held by the engine
    pub live_buckets: usize,
}
