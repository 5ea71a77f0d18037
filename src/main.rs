//! agent-relay
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  RELAY                        │
//!   POST /api/...    │  ┌────────┐   ┌────────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│   relay    │──▶│ upstream │──┼──▶ Upstream API
//!                    │  │ server │   │  handler   │   │  client  │  │
//!   JSON response    │  └────────┘   └────────────┘   └──────────┘  │
//!   ◀────────────────┼──  status + body, or { "error": ... }        │
//!                    │                                              │
//!                    │  config (TOML + API_ENDPOINT, hot reload)    │
//!                    │  observability (tracing, metrics)            │
//!                    │  lifecycle (signals, graceful shutdown)      │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use agent_relay::config::{load_config, load_from_env};
use agent_relay::lifecycle::startup;
use agent_relay::observability::logging;

#[derive(Parser)]
#[command(name = "agent-relay", version, about = "Forward JSON POST requests to a configured upstream")]
struct Args {
    /// TOML configuration file. Without one, defaults plus the environment apply.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        route = %config.listener.route,
        client = ?config.upstream.client,
        endpoint_configured = config.upstream.endpoint.is_some(),
        missing_endpoint = ?config.upstream.missing_endpoint,
        "Configuration loaded"
    );

    startup::run(config, args.config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
