//! Daybook API Server
//!
//! Run with: cargo run --bin daybook
//!
//! # Configuration
//!
//! Read from the first config file found (see `daybook-cli config`), then
//! overridden by environment variables:
//! - `DAYBOOK_DATA_DIR`: Data directory for `daybook.db` and images
//! - `DAYBOOK_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `DAYBOOK_API_PORT`: Port to listen on (default: 5003)
//! - `DAYBOOK_LOG_LEVEL`: Log level (default: info)
//! - `DAYBOOK_LOG_FORMAT`: `pretty` or `json`
//! - `DAYBOOK_THINGS_DB`: Path to the Things 3 `main.sqlite`
//! - `DAYBOOK_WEATHER_URL`: open-meteo API root
//! - `RUST_LOG`: Full filter directive, takes precedence over the log level

use anyhow::Context;
use daybook::api::{serve, AppState};
use daybook::config::{Config, LoggingConfig};
use daybook::integrations::Integrations;
use daybook::store::SqliteStore;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging)?;

    tracing::info!("Starting Daybook API server v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);

    let store = SqliteStore::open(&data_dir)
        .with_context(|| format!("Failed to open reflection store in {:?}", data_dir))?;
    let store = Arc::new(store);
    tracing::info!(
        db = ?store.db_path(),
        reflections = store.count().unwrap_or_default(),
        "Reflection store ready"
    );

    let integrations = Integrations::from_config(&config.integrations);
    for integration in integrations.all() {
        tracing::info!(integration = integration.name(), "Integration enabled");
    }

    let state =
        AppState::new(Arc::clone(&store), config.api.clone()).with_integrations(integrations);
    serve(state, &config.api).await?;

    tracing::info!("Daybook API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if logging.is_json() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(logging.file.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    Ok(())
}
