//! Payload validation for incoming transactions
//!
//! Turns a raw request body into a [`Transaction`] the engine can trust:
//! - the body must be a JSON object (`400`)
//! - `amount` must be a decimal string or number (`422`)
//! - `timestamp` must be an RFC 3339 instant, not in the future (`422`)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use window_stats::{Transaction, TransactionError};

use crate::models::TransactionRequest;

/// Reasons a transaction payload is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is not a JSON object
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required field absent or null
    #[error("Field '{0}' missing")]
    MissingField(&'static str),

    /// Amount is not a decimal number
    #[error("Field 'amount' is not a decimal number: {0}")]
    InvalidAmount(String),

    /// Timestamp is not an ISO-8601 instant
    #[error("Field 'timestamp' is not an ISO-8601 instant: {0}")]
    InvalidTimestamp(String),

    /// Timestamp lies after receipt time
    #[error("Field 'timestamp' must not be in the future")]
    FutureTimestamp,
}

impl ValidationError {
    /// Whether the payload shape itself is wrong, as opposed to a field value
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedPayload(_))
    }

    /// Stable code used in error bodies and metrics labels
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::MissingField(_) => "missing_field",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidTimestamp(_) => "invalid_timestamp",
            Self::FutureTimestamp => "future_timestamp",
        }
    }
}

impl From<TransactionError> for ValidationError {
    fn from(error: TransactionError) -> Self {
        match error {
            TransactionError::FutureTimestamp { .. } => Self::FutureTimestamp,
        }
    }
}

/// Parse and validate a raw body received at `now`
pub fn parse_transaction(body: &[u8], now: DateTime<Utc>) -> Result<Transaction, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(ValidationError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    }
    let request: TransactionRequest = serde_json::from_value(value)
        .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

    let amount = parse_amount(request.amount)?;
    let timestamp = parse_timestamp(request.timestamp)?;

    Ok(Transaction::new(amount, timestamp, now)?)
}

fn parse_amount(value: Option<Value>) -> Result<Decimal, ValidationError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("amount")),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(ValidationError::InvalidAmount(other.to_string())),
    };

    // Digit separators are not part of a decimal literal
    let trimmed = raw.trim();
    if trimmed.contains('_') {
        return Err(ValidationError::InvalidAmount(raw));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidAmount(raw.clone()))
}

fn parse_timestamp(value: Option<Value>) -> Result<DateTime<Utc>, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField("timestamp")),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| ValidationError::InvalidTimestamp(s)),
        Some(other) => Err(ValidationError::InvalidTimestamp(other.to_string())),
    }
}
