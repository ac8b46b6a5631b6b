//! Mobile-Core Configuration Console (core)
//!
//! Derivation-and-consistency engine behind a mobile-core configuration
//! console, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────────┐
//!                    │                 CONSOLE CORE                      │
//!                    │                                                   │
//!  "config changed"  │  ┌───────────┐   ┌────────────┐   ┌───────────┐  │
//!  ──────────────────┼─▶│   sync    │──▶│ derivation │──▶│   cache   │  │
//!                    │  │ scheduler │   │   engine   │   │ (arc-swap)│  │
//!                    │  └─────┬─────┘   └────────────┘   └─────┬─────┘  │
//!                    │        │ fetch                          │ load   │
//!                    │        ▼                                ▼        │
//!  slice / group     │  ┌───────────┐                    ┌───────────┐  │
//!  writes            │  │ raw store │                    │    api    │──┼──▶ view reads
//!  ──────────────────┼─▶│ (document │                    │  (axum)   │  │
//!                    │  │   store)  │                    └───────────┘  │
//!                    │  └─────┬─────┘                                   │
//!                    │        │ membership changes                      │
//!                    │        ▼                                         │
//!                    │  ┌─────────────────────────┐                     │
//!                    │  │ consistency propagator  │  5 per-subscriber   │
//!                    │  │ (saga + batch writer)   │  collections        │
//!                    │  └─────────────────────────┘                     │
//!                    └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use config_console::config::loader::load_config;
use config_console::config::ConsoleConfig;
use config_console::observability::logging;
use config_console::store::MemoryStore;
use config_console::ConsoleService;

#[derive(Parser, Debug)]
#[command(version, about = "Mobile-core configuration console core")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConsoleConfig::default(),
    };

    logging::init(&config.observability.log_filter);
    tracing::info!("config-console v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.api.bind_address,
        retry_delay_ms = config.sync.retry_delay_ms,
        chunk_size = config.batch.chunk_size,
        "Configuration loaded"
    );

    // Local mode runs against the in-process store; a deployment wires a
    // persistent DocumentStore implementation here instead.
    let store = Arc::new(MemoryStore::new());
    let (service, scheduler) = ConsoleService::new(store, &config);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(scheduler.run(shutdown_rx));

    // Seed the cache from whatever raw state exists at startup
    service.notify_config_changed();

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    let router = config_console::api::build_router(
        service,
        Duration::from_secs(config.api.request_timeout_secs),
    );
    config_console::api::run(listener, router, shutdown_tx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
