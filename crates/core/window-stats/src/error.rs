//! Engine error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when constructing a [`crate::Transaction`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Timestamp lies after the validation instant
    #[error("timestamp {timestamp} is in the future (now: {now})")]
    FutureTimestamp {
        /// Offending timestamp
        timestamp: DateTime<Utc>,
        /// Instant the check was made against
        now: DateTime<Utc>,
    },
}
