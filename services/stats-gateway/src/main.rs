//! Statistics Gateway - Main Entry Point

use anyhow::Result;
use clap::{Arg, Command};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stats_gateway::{GatewayConfig, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stats_gateway=info,window_stats=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let matches = Command::new("stats-gateway")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rolling 60-second transaction statistics over REST")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("stats-gateway.toml"),
        )
        .arg(
            Arg::new("routes")
                .long("routes")
                .help("Print available routes and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("routes") {
        stats_gateway::server::print_routes();
        return Ok(());
    }

    // Load configuration
    let default_config = "stats-gateway.toml".to_string();
    let config_path = matches
        .get_one::<String>("config")
        .unwrap_or(&default_config);
    let config = match GatewayConfig::from_file(config_path) {
        Ok(config) => {
            info!("Loaded configuration from: {}", config_path);
            config
        }
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path, e);
            info!("Using default configuration");
            GatewayConfig::default()
        }
    };

    info!("Starting Statistics Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Server will bind to: {}", config.server_address());
    info!("Features enabled:");
    info!("  CORS: {}", config.cors.enabled);
    info!("  Metrics: {}", config.monitoring.metrics_enabled);
    info!("  Compression: {}", config.server.compression);
    info!(
        "  Compaction: {} (every {}s)",
        config.window.compaction_enabled, config.window.compaction_interval_secs
    );

    if let Err(e) = start_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
