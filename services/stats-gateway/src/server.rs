//! Statistics gateway server implementation

use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc, time::Duration, time::Instant};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use window_stats::{StatisticsEngine, TransactionStatistics};

use crate::{
    config::GatewayConfig,
    error::ApiError,
    handlers::{HealthHandlers, StatisticsHandlers, TransactionHandlers},
    metrics::GatewayMetrics,
    middleware::{create_cors_layer, logging_middleware},
    models::HealthCheckResponse,
};

/// Unified application state containing all handlers
#[derive(Clone)]
pub struct AppState {
    pub transaction_handlers: TransactionHandlers,
    pub statistics_handlers: StatisticsHandlers,
    pub health_handlers: HealthHandlers,
}

/// Statistics gateway server
pub struct StatsGatewayServer {
    config: GatewayConfig,
    engine: Arc<StatisticsEngine>,
    start_time: Instant,
}

impl StatsGatewayServer {
    /// Create a server around a fresh engine on the system clock
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_engine(config, Arc::new(StatisticsEngine::new()))
    }

    /// Create a server around an existing engine
    #[must_use]
    pub fn with_engine(config: GatewayConfig, engine: Arc<StatisticsEngine>) -> Self {
        info!("Initializing statistics gateway server");
        Self {
            config,
            engine,
            start_time: Instant::now(),
        }
    }

    /// Shared engine
    #[must_use]
    pub const fn engine(&self) -> &Arc<StatisticsEngine> {
        &self.engine
    }

    /// Start the server and run until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = match self.config.server_address().parse() {
            Ok(addr) => addr,
            Err(e) => {
                error!(
                    "Invalid server address '{}': {}",
                    self.config.server_address(),
                    e
                );
                return Err(anyhow::anyhow!("Invalid server address: {}", e));
            }
        };

        let app = self.create_app();
        let compaction = self.spawn_compaction();

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("Statistics gateway listening on {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind TCP listener to {}: {}", addr, e);
                return Err(anyhow::anyhow!("Failed to bind to address {}: {}", addr, e));
            }
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(task) = compaction {
            task.abort();
        }

        if let Err(e) = served {
            error!("Server encountered a fatal error: {}", e);
            return Err(anyhow::anyhow!("Server error: {}", e));
        }

        info!("Statistics gateway stopped");
        Ok(())
    }

    /// Create the Axum application with all routes and middleware
    pub fn create_app(&self) -> Router {
        create_router(Arc::clone(&self.engine), &self.config, self.start_time)
    }

    /// Periodic compaction task, when enabled in the window config
    pub fn spawn_compaction(&self) -> Option<JoinHandle<()>> {
        if !self.config.window.compaction_enabled {
            debug!("Bucket compaction disabled");
            return None;
        }

        let period = Duration::from_secs(self.config.window.compaction_interval_secs.max(1));
        info!("Bucket compaction every {:?}", period);
        Some(spawn_compaction_task(Arc::clone(&self.engine), period))
    }
}

/// Evict buckets that left the window every `period`
///
/// The first pass runs immediately.
pub fn spawn_compaction_task(engine: Arc<StatisticsEngine>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let metrics = GatewayMetrics;
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = engine.compact();
            metrics.record_compaction(evicted, engine.bucket_count());
        }
    })
}

/// Build the router serving `engine`
pub fn create_router(
    engine: Arc<StatisticsEngine>,
    config: &GatewayConfig,
    start_time: Instant,
) -> Router {
    let metrics = GatewayMetrics;
    if config.monitoring.metrics_enabled && !GatewayMetrics::install() {
        warn!("Metrics endpoint will report metrics as disabled");
    }

    let app_state = AppState {
        transaction_handlers: TransactionHandlers::new(Arc::clone(&engine), metrics),
        statistics_handlers: StatisticsHandlers::new(Arc::clone(&engine)),
        health_handlers: HealthHandlers::new(engine, start_time),
    };

    let mut app = Router::new()
        .route(&config.monitoring.health_path, get(health_check))
        .route(
            "/transactions",
            post(create_transaction).delete(delete_transactions),
        )
        .route("/statistics", get(get_statistics));

    if config.monitoring.metrics_enabled {
        app = app.route(&config.monitoring.metrics_path, get(metrics_endpoint));
    }

    let mut app = app
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.timeout_seconds),
        ))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http());

    if config.server.compression {
        app = app.layer(CompressionLayer::new());
    }
    if config.cors.enabled {
        app = app.layer(create_cors_layer(config));
    }

    info!("Statistics gateway routes configured");
    app
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections");
}

// Handler wrapper functions to work with unified state
async fn create_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    TransactionHandlers::create_transaction(State(state.transaction_handlers), body).await
}

async fn delete_transactions(State(state): State<AppState>) -> StatusCode {
    TransactionHandlers::delete_transactions(State(state.transaction_handlers)).await
}

async fn get_statistics(State(state): State<AppState>) -> Json<TransactionStatistics> {
    StatisticsHandlers::get_statistics(State(state.statistics_handlers)).await
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    HealthHandlers::health_check(State(state.health_handlers)).await
}

async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, ApiError> {
    HealthHandlers::metrics(State(state.health_handlers)).await
}

/// API route documentation
pub fn print_routes() {
    println!("Statistics Gateway Routes:");
    println!("==========================");
    println!();
    println!("Transactions:");
    println!("  POST   /transactions  - Record a transaction (201 counted, 204 too old)");
    println!("  DELETE /transactions  - Drop every recorded transaction");
    println!();
    println!("Statistics:");
    println!("  GET    /statistics    - Sum, avg, max, min and count over the last 60s");
    println!();
    println!("Health & Monitoring:");
    println!("  GET    /health        - Health check");
    println!("  GET    /metrics       - Prometheus metrics");
}
