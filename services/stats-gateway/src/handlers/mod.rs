//! API handlers for the statistics endpoints

pub mod health;
pub mod statistics;
pub mod transactions;

pub use health::HealthHandlers;
pub use statistics::StatisticsHandlers;
pub use transactions::TransactionHandlers;
