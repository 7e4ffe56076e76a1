//! Barbarian proxy
//!
//! A transparent forwarding proxy for `https://barbarian.men` built with
//! Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                  BARBARIAN PROXY                    │
//!                    │                                                     │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌─────────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│  proxy   │──▶│ proxy::resolve  │  │
//!                    │  │ server  │   │  ::path  │   │ (bounded hops)  │  │
//!                    │  └─────────┘   └──────────┘   └────────┬────────┘  │
//!                    │                                         │           │
//!                    │                                         ▼           │
//!   Client Response  │  ┌──────────────────┐        ┌─────────────────┐   │
//!   ◀────────────────┼──│ proxy::pipeline  │◀───────│ proxy::forward  │◀──┼── barbarian.men
//!                    │  │ (inject / stream)│        │ (HTTPS client)  │   │
//!                    │  └──────────────────┘        └─────────────────┘   │
//!                    │                                                     │
//!                    │  config · inject (assets) · lifecycle (signals)     │
//!                    └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barbarian_proxy::config::loader::load_config;
use barbarian_proxy::http::HttpServer;
use barbarian_proxy::inject::InjectionPayload;
use barbarian_proxy::lifecycle::{signals, Shutdown};

/// Transparent forwarding proxy for barbarian.men.
#[derive(Debug, Parser)]
#[command(name = "barbarian-proxy", version)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listening port (overrides the config file and PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barbarian_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("barbarian-proxy v0.1.0 starting");

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.set_port(port);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin(),
        path_prefix = %config.upstream.path_prefix,
        max_hops = config.redirects.max_hops,
        "Configuration loaded"
    );

    // Missing assets are fatal here, before any traffic is accepted
    let payload = InjectionPayload::load(&config.assets)?;
    tracing::info!(
        style_bytes = payload.style.len(),
        script_bytes = payload.script.len(),
        "Injection payload loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_listener(shutdown);

    let server = HttpServer::new(config, payload);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
