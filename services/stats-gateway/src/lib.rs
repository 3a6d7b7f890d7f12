//! Statistics Gateway
//!
//! REST front end for the rolling 60-second transaction statistics engine.
//! Features:
//! - Transaction ingestion with boundary validation
//! - Constant-time window statistics
//! - Optional background compaction of stale buckets
//! - Prometheus metrics and request tracing

#![allow(missing_docs)]

use anyhow::Result;

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod server;
pub mod validation;

pub use config::{CorsConfig, GatewayConfig, MonitoringConfig, ServerConfig, WindowConfig};
pub use error::ApiError;
pub use server::{StatsGatewayServer, create_router};
pub use validation::{ValidationError, parse_transaction};

/// Start the statistics gateway server
pub async fn start_server(config: GatewayConfig) -> Result<()> {
    let server = StatsGatewayServer::new(config);
    server.start().await
}
