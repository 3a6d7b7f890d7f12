//! Transaction ingestion and reset handlers

use axum::{body::Bytes, extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::{debug, info, warn};
use window_stats::{IngestOutcome, StatisticsEngine};

use crate::{error::ApiError, metrics::GatewayMetrics, validation::parse_transaction};

/// Transaction handlers
#[derive(Clone)]
pub struct TransactionHandlers {
    engine: Arc<StatisticsEngine>,
    metrics: GatewayMetrics,
}

impl TransactionHandlers {
    pub const fn new(engine: Arc<StatisticsEngine>, metrics: GatewayMetrics) -> Self {
        Self { engine, metrics }
    }

    /// Record a transaction
    ///
    /// `201` when it counts toward the window, `204` when it is already too old.
    pub async fn create_transaction(
        State(handlers): State<Self>,
        body: Bytes,
    ) -> Result<StatusCode, ApiError> {
        let received_at = handlers.engine.now();
        let transaction = match parse_transaction(&body, received_at) {
            Ok(transaction) => transaction,
            Err(e) => {
                warn!("Rejected transaction payload: {}", e);
                handlers.metrics.record_rejected(e.code());
                return Err(e.into());
            }
        };

        let outcome = handlers.engine.ingest(&transaction);
        handlers.metrics.record_transaction(outcome);
        debug!(
            amount = %transaction.amount(),
            timestamp = %transaction.timestamp(),
            ?outcome,
            "Transaction processed"
        );

        Ok(match outcome {
            IngestOutcome::Accepted => StatusCode::CREATED,
            IngestOutcome::Expired => StatusCode::NO_CONTENT,
        })
    }

    /// Drop every recorded transaction
    pub async fn delete_transactions(State(handlers): State<Self>) -> StatusCode {
        info!("Reset requested");
        handlers.engine.reset();
        handlers.metrics.record_reset();
        handlers.metrics.set_live_buckets(0);
        StatusCode::NO_CONTENT
    }
}

impl std::fmt::Debug for TransactionHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionHandlers")
            .field("engine", &"Arc<StatisticsEngine>")
            .finish()
    }
}
