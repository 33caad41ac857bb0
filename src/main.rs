//! Media relay server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request              ┌──────────────────────────────────────────┐
//!     ────────────────────────────┼─▶ http::server (request id, trace)       │
//!                                 │      │                                   │
//!                                 │      ├─ OPTIONS ─▶ http::cors            │
//!                                 │      ├─ "/" ─────▶ http::index           │
//!                                 │      ├─ "/http…" ▶ relay::target         │
//!                                 │      │              → relay::forward ────┼──▶ Upstream
//!                                 │      └─ else ────▶ 404                   │     media host
//!     Client Response             │                                          │
//!     ◀───────────────────────────┼── CORS-amended response ◀────────────────┼───
//!                                 └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use media_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use media_relay::lifecycle::{wait_for_signal, Shutdown};
use media_relay::observability::{logging, metrics};
use media_relay::RelayServer;

#[derive(Parser)]
#[command(name = "media-relay")]
#[command(about = "Single-hop HTTP relay for social-media media endpoints", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!("media-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = ?config.timeouts.request_secs,
        upstream_timeout_secs = ?config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = wait_for_signal() => {}
    }
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
