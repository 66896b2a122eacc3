//! Media stream gateway relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────┐
//!                         │              GATEWAY RELAY               │
//!   GET /stream/{id}      │  ┌────────┐   ┌──────────┐   ┌────────┐  │   GET /download/{id}
//!   ──────────────────────┼─▶│  http  │──▶│  relay   │──▶│upstream│──┼──────────────────────▶
//!                         │  │ server │   │ handler  │   │ client │  │   X-Forwarded-For
//!                         │  └────────┘   └──────────┘   └────────┘  │   X-Proxy-Host
//!                         │                                   │      │
//!   streamed body         │  ┌────────────┐   ┌───────────┐   │      │   streamed body
//!   ◀─────────────────────┼──│  metered   │◀──│ response  │◀──┘◀─────┼───────────────────────
//!                         │  │  stream    │   │ head      │          │   BACKEND PRODUCER
//!                         │  └────────────┘   └───────────┘          │
//!                         └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use media_relay::config::{load_config, RelayConfig};
use media_relay::http::HttpServer;
use media_relay::lifecycle::Shutdown;
use media_relay::observability::{logging, metrics};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "media-relay")]
#[command(about = "Public gateway relaying media streams from an internal producer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Fail fast: nothing is bound until the configuration is valid.
    let config: RelayConfig = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);
    tracing::info!("media-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        backend = config.upstream.base_url.as_deref().unwrap_or_default(),
        "Gateway relay listening"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
