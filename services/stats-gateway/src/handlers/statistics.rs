//! Rolling window statistics handler

use axum::{extract::State, response::Json};
use std::sync::Arc;
use window_stats::{StatisticsEngine, TransactionStatistics};

/// Statistics handlers
#[derive(Clone)]
pub struct StatisticsHandlers {
    engine: Arc<StatisticsEngine>,
}

impl StatisticsHandlers {
    pub const fn new(engine: Arc<StatisticsEngine>) -> Self {
        Self { engine }
    }

    /// Summary of the last 60 seconds
    pub async fn get_statistics(State(handlers): State<Self>) -> Json<TransactionStatistics> {
        Json(handlers.engine.query())
    }
}
