//! hostwarden scan server
//!
//! Accepts scan submissions over HTTP and runs them as background jobs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hw_core::config::{self, ScannerConfig};
use hw_orchestrator::server::{self, spawn_signal_handler};
use hw_orchestrator::ServerState;

#[derive(Parser)]
#[command(name = "hw-orchestrator")]
#[command(about = "hostwarden scan server")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<ScannerConfig> {
    if let Some(path) = path {
        return config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(config::load_config(&default_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
            ScannerConfig::default()
        }))
    } else {
        tracing::info!("Using default configuration");
        Ok(ScannerConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { &args.log_level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("hostwarden scan server starting...");

    let config = load_config(args.config.as_ref())?;
    let bind = args.bind.unwrap_or_else(|| config.bind_address.clone());
    tracing::info!("Reports directory: {:?}", config.reports_dir);

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    server::serve(ServerState::new(config), &bind, cancel).await
}
