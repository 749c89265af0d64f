//! Vital Signs Fusion Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load configuration")?;
    init_logging(&config.log_level, config.log_format);

    info!("=== Vital Signs Fusion Service v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await.context("server terminated")?;

    Ok(())
}
