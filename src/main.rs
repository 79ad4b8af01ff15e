//! Canopy: request handlers for the tree-care assistant.
//!
//! This is the host entry point. It initializes tracing, loads configuration
//! from a TOML file, resolves the deployment stage and region, builds the
//! dependency clients and handlers, and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canopy::config::{AppConfig, HandlerConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use canopy::http::start_server;
use canopy::probes::HttpServiceClient;
use canopy::routes::create_router;
use canopy::state::AppState;

/// Canopy: request handlers for the tree-care assistant
#[derive(Parser, Debug)]
#[command(name = "canopy", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "canopy=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration first so the log format is known
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(path = %args.config, "Loaded configuration");

    // Stage and region are resolved once here and never re-read
    let handler_config = HandlerConfig::from_env(&config.environment);
    tracing::info!(
        stage = %handler_config.stage,
        region = %handler_config.region,
        production = handler_config.is_production(),
        "Resolved handler environment"
    );

    let deps = HttpServiceClient::dependencies(&config.services)?;
    tracing::info!(
        record_store = %config.services.record_store,
        blob_store = %config.services.blob_store,
        identity = %config.services.identity,
        probe_timeout_ms = config.services.probe_timeout_ms,
        "Configured dependency probes"
    );

    let state = AppState::new(config.clone(), handler_config, deps);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
