//! Health check and monitoring handlers

use axum::{extract::State, response::Json};
use std::{sync::Arc, time::Instant};
use tracing::debug;
use window_stats::StatisticsEngine;

use crate::{error::ApiError, metrics::GatewayMetrics, models::HealthCheckResponse};

/// Health check handlers
#[derive(Clone)]
pub struct HealthHandlers {
    engine: Arc<StatisticsEngine>,
    start_time: Instant,
}

impl HealthHandlers {
    pub const fn new(engine: Arc<StatisticsEngine>, start_time: Instant) -> Self {
        Self { engine, start_time }
    }

    /// Health check endpoint
    pub async fn health_check(State(handlers): State<Self>) -> Json<HealthCheckResponse> {
        debug!("Health check request");

        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: handlers.start_time.elapsed().as_secs(),
            live_buckets: handlers.engine.bucket_count(),
        })
    }

    /// Prometheus metrics endpoint
    pub async fn metrics(State(handlers): State<Self>) -> Result<String, ApiError> {
        let metrics = GatewayMetrics;
        metrics.set_live_buckets(handlers.engine.bucket_count());
        GatewayMetrics::render().ok_or(ApiError::MetricsDisabled)
    }
}
