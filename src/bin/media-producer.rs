//! Backend producer: resolves resource ids to media streams.

use std::path::PathBuf;

use clap::Parser;
use media_relay::config::{load_config, ProducerConfig};
use media_relay::lifecycle::Shutdown;
use media_relay::observability::{logging, metrics};
use media_relay::producer::ProducerServer;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "media-producer")]
#[command(about = "Internal service streaming media for the gateway relay", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PRODUCER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: ProducerConfig = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);
    tracing::info!("media-producer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = ProducerServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Backend producer listening");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
