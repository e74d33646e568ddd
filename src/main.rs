use anyhow::Context;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;

mod analysis;
mod cli;
mod config;
mod core;
mod web;

use crate::cli::Args;
use crate::config::DashboardConfig;
use crate::core::dataset::Dataset;
use crate::web::server::{start_web_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(args.log_filter()));
    info!("Starting startup funding dashboard...");

    let config = DashboardConfig::resolve(&args).context("Failed to load configuration")?;

    // Load the dataset once; every analysis shares it read-only
    let dataset = Dataset::load(&config.dataset.path).with_context(|| {
        format!("Failed to load dataset from {}", config.dataset.path.display())
    })?;
    let dataset = Arc::new(dataset);

    let state = AppState::new(dataset, config);
    info!("Analysis components initialized");

    // Start the web interface
    let server = start_web_server(state).context("Failed to start web server")?;
    let handle = server.handle();
    let web_server_handle = tokio::spawn(server);

    info!("Dashboard is now running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutting down dashboard...");

    // Graceful shutdown
    handle.stop(true).await;
    match web_server_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Web server error: {}", e),
        Err(e) => error!("Error during web server shutdown: {:?}", e),
    }

    info!("Dashboard shutdown complete");
    Ok(())
}
