mod config;
mod constants;
mod document;
mod error;
mod formatters;
mod models;
mod service;
mod storage;
mod store;
mod weather;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::service::WeatherServer;
use crate::storage::JsonFileStorage;
use crate::store::StateStore;
use crate::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stream, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_weather_memory_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::parse();
    tracing::info!(
        memory_file = %config.memory_file.display(),
        api_base = %config.api_base,
        "Starting MCP weather memory server"
    );

    let store = StateStore::open(
        JsonFileStorage::new(&config.memory_file),
        config.history_cap,
    );
    let weather = WeatherClient::new(&config.api_base, config.request_timeout())?;

    let server = WeatherServer::new(Arc::new(store), weather)
        .serve(rmcp::transport::stdio())
        .await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
