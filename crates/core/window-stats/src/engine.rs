//! Rolling-window statistics engine

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::statistics::{TransactionStatistics, WindowAggregate};
use crate::store::BucketStore;
use crate::transaction::Transaction;

/// Seconds before `now` that are still inside the window
pub const WINDOW_LOOKBACK_SECS: i64 = 59;

/// Distinct second buckets covered by one query
pub const WINDOW_BUCKETS: i64 = WINDOW_LOOKBACK_SECS + 1;

/// Result of handing a transaction to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Counted in the window
    Accepted,
    /// Older than the window, dropped without touching the store
    Expired,
}

/// Aggregates transactions over the trailing 60 wall-clock seconds
pub struct StatisticsEngine {
    store: BucketStore,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StatisticsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsEngine")
            .field("store", &self.store)
            .field("clock", &"Arc<dyn Clock>")
            .finish()
    }
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsEngine {
    /// Engine driven by the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Engine driven by a caller-supplied clock
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: BucketStore::new(),
            clock,
        }
    }

    /// Current instant as seen by the engine
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record a transaction unless it already fell out of the window
    pub fn ingest(&self, transaction: &Transaction) -> IngestOutcome {
        let key = transaction.epoch_second();
        let cutoff = self.clock.now() - TimeDelta::seconds(WINDOW_LOOKBACK_SECS);

        if transaction.timestamp() < cutoff {
            debug!(
                timestamp = %transaction.timestamp(),
                cutoff = %cutoff,
                "Transaction expired"
            );
            return IngestOutcome::Expired;
        }

        self.store.get_or_create(key).add(transaction.amount());
        debug!(
            second = key,
            amount = %transaction.amount(),
            "Transaction accepted"
        );
        IngestOutcome::Accepted
    }

    /// Statistics over the seconds `[now - 59, now]`
    #[must_use]
    pub fn query(&self) -> TransactionStatistics {
        let current = self.clock.now().timestamp();
        let mut aggregate = WindowAggregate::default();

        for key in (current - WINDOW_LOOKBACK_SECS)..=current {
            if let Some(bucket) = self.store.lookup(key) {
                aggregate.merge(&bucket.snapshot());
            }
        }

        debug!(count = aggregate.count(), "Window statistics computed");
        aggregate.finish()
    }

    /// Discard every recorded transaction
    pub fn reset(&self) {
        self.store.clear();
        info!("Transaction statistics reset");
    }

    /// Evict buckets older than the window's earliest second
    ///
    /// Buckets are otherwise retained until [`Self::reset`]; callers that run
    /// for long periods schedule this to bound memory.
    pub fn compact(&self) -> usize {
        let earliest = self.clock.now().timestamp() - WINDOW_LOOKBACK_SECS;
        let removed = self.store.retain_from(earliest);
        if removed > 0 {
            debug!(removed, earliest, "Compacted stale buckets");
        }
        removed
    }

    /// Number of buckets currently held, including stale ones
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.store.len()
    }
}
