//! Validated transaction value

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::TransactionError;

/// A monetary transaction at an instant that is not in the future
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build a transaction, rejecting timestamps after `now`
    pub fn new(
        amount: Decimal,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        if timestamp > now {
            return Err(TransactionError::FutureTimestamp { timestamp, now });
        }
        Ok(Self { amount, timestamp })
    }

    /// Transaction amount
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Transaction instant
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Epoch second this transaction is bucketed under
    #[must_use]
    pub fn epoch_second(&self) -> i64 {
        self.timestamp.timestamp()
    }
}
