//! Serve command: run the scan server in the foreground

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use hw_core::config::ScannerConfig;
use hw_orchestrator::server::{serve, spawn_signal_handler};
use hw_orchestrator::ServerState;

pub async fn serve_command(config: ScannerConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.bind_address.clone());
    tracing::info!("hostwarden scan server starting on {}", bind);

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());
    serve(ServerState::new(config), &bind, cancel).await
}
