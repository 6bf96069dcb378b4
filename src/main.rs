//! Edge relay (v1)
//!
//! A stateless request router built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                      EDGE RELAY                       │
//!                       │                                                       │
//!  Client Request       │  ┌──────────┐    ┌────────────┐    ┌──────────────┐  │
//!  ─────────────────────┼─▶│   http   │───▶│  dispatch  │─┬─▶│ audio relay  │──┼──▶ Media host
//!                       │  │  server  │    │ (method +  │ │  │ + policy     │  │    (allow-listed)
//!                       │  └──────────┘    │  query)    │ │  └──────────────┘  │
//!                       │                  └────────────┘ │  ┌──────────────┐  │
//!                       │                                 └─▶│  API relay   │──┼──▶ Search API
//!                       │                                    └──────────────┘  │
//!  Client Response      │  ┌──────────────────────────┐             │          │
//!  ◀────────────────────┼──│ safe headers + CORS,     │◀────────────┘          │
//!                       │  │ streamed body            │                        │
//!                       │  └──────────────────────────┘                        │
//!                       └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_relay::config::{self, RelayConfig};
use edge_relay::lifecycle::{signals, Shutdown};
use edge_relay::observability::init_logging;
use edge_relay::HttpServer;

#[derive(Parser)]
#[command(name = "edge-relay")]
#[command(about = "CORS relay for a music search API and allow-listed audio hosts", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    init_logging(&config.observability.log_level);

    tracing::info!("edge-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_base_url = %config.upstream.api_base_url,
        config_file = ?cli.config,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
