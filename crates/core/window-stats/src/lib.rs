//! Rolling-Window Transaction Statistics
//!
//! Exact aggregate statistics over the trailing 60 wall-clock seconds:
//! - Per-second buckets holding sum, extrema and count under their own lock
//! - Sharded bucket map with atomic get-or-create
//! - Window query merging up to 60 bucket snapshots
//! - Two-digit half-up rendering of every monetary field

pub mod bucket;
pub mod clock;
pub mod engine;
pub mod error;
pub mod statistics;
pub mod store;
pub mod transaction;

pub use bucket::{BucketSnapshot, TimeBucket};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{IngestOutcome, StatisticsEngine, WINDOW_BUCKETS, WINDOW_LOOKBACK_SECS};
pub use error::TransactionError;
pub use statistics::{TransactionStatistics, WindowAggregate, round_money};
pub use store::BucketStore;
pub use transaction::Transaction;
