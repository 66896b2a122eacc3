use std::path::PathBuf;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator client for the media relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a resource through the gateway
    Fetch {
        /// Resource id to request
        id: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check component health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Fetch { id, output } => {
            let res = client.get(format!("{}/stream/{}", base, id)).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: relay returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                std::process::exit(1);
            }

            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();

            let mut sink: Box<dyn tokio::io::AsyncWrite + Unpin> = match &output {
                Some(path) => Box::new(tokio::fs::File::create(path).await?),
                None => Box::new(tokio::io::stdout()),
            };

            let mut total: u64 = 0;
            let mut body = res.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        sink.flush().await?;
                        eprintln!("Error: stream ended early after {} bytes: {}", total, e);
                        std::process::exit(2);
                    }
                };
                total += chunk.len() as u64;
                sink.write_all(&chunk).await?;
            }
            sink.flush().await?;

            eprintln!("Received {} bytes ({})", total, content_type);
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: health check returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
