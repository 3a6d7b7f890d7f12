//! Per-second partial aggregate

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::trace;

/// Immutable copy of a bucket's aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketSnapshot {
    /// Sum of amounts
    pub sum: Decimal,
    /// Largest amount, `None` until the first write
    pub max: Option<Decimal>,
    /// Smallest amount, `None` until the first write
    pub min: Option<Decimal>,
    /// Number of transactions
    pub count: u64,
}

#[derive(Debug, Default)]
struct BucketState {
    sum: Decimal,
    max: Option<Decimal>,
    min: Option<Decimal>,
    count: u64,
}

/// Aggregate of every transaction whose timestamp truncates to one epoch second
#[derive(Debug, Default)]
pub struct TimeBucket {
    state: Mutex<BucketState>,
}

impl TimeBucket {
    /// Create an empty bucket
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one amount into the bucket
    pub fn add(&self, amount: Decimal) {
        let mut state = self.state.lock();

        // First write seeds both extrema
        match (state.max, state.min) {
            (Some(max), Some(min)) => {
                if amount > max {
                    state.max = Some(amount);
                }
                if amount < min {
                    state.min = Some(amount);
                }
            }
            _ => {
                state.max = Some(amount);
                state.min = Some(amount);
            }
        }

        state.sum = state.sum.saturating_add(amount);
        state.count += 1;

        trace!(amount = %amount, count = state.count, "Bucket updated");
    }

    /// Point-in-time copy of the aggregate
    #[must_use]
    pub fn snapshot(&self) -> BucketSnapshot {
        let state = self.state.lock();
        if state.count == 0 {
            return BucketSnapshot::default();
        }
        BucketSnapshot {
            sum: state.sum,
            max: state.max,
            min: state.min,
            count: state.count,
        }
    }
}
