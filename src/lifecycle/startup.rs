//! Startup orchestration.
//!
//! Order: metrics exporter, listener bind, upstream client, config watcher,
//! then serve until a shutdown signal. Any startup error is fatal; a
//! watcher that fails to start only disables hot reload.

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Start the relay and block until it has shut down.
pub async fn run(config: RelayConfig, config_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let watcher = config_path.map(|path| ConfigWatcher::new(&path, config.clone()));
    let server = HttpServer::new(config)?;

    // Keep the watch handle alive for the lifetime of the server.
    let (_watch, config_updates) = match watcher.map(ConfigWatcher::spawn) {
        Some(Ok((handle, updates))) => (Some(handle), updates),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
            (None, mpsc::unbounded_channel().1)
        }
        None => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    signals::wait_for_shutdown().await;
    shutdown.trigger();

    server_task.await??;
    Ok(())
}
