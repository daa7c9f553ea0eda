//! Voice demo bridge service.
//!
//! ```text
//!   Browser                    voice-bridge                        Voice service
//!  ─────────                  ──────────────                      ───────────────
//!  POST /api/voice-demo ──▶  validate ──▶ open WebSocket ───────▶  /ws
//!                                          send request ────────▶
//!                                          await one reply ◀─────  response | error
//!  ◀── reply or error ─────  close session ─────────────────────▶
//!
//!  GET /api/voice-demo  ──▶  GET /status ───────────────────────▶  /status
//!                            WebSocket open/close ──────────────▶  /ws
//!  ◀── diagnostics ────────
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use voice_bridge::lifecycle::signals::termination_signal;
use voice_bridge::lifecycle::startup::{resolve_config, Overrides};
use voice_bridge::observability::{logging, metrics};
use voice_bridge::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "voice-bridge")]
#[command(about = "HTTP to WebSocket bridge for the voice demo", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.base_url
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(
        args.config.as_deref(),
        Overrides {
            bind_address: args.bind,
            upstream_url: args.upstream,
        },
    )?;

    logging::init_logging(&config.observability)?;
    tracing::info!("voice-bridge v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        connect_timeout_ms = config.timeouts.connect_ms,
        response_timeout_ms = config.timeouts.response_ms,
        personas = ?config.bridge.personas,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        termination_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
