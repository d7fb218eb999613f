//! Backend test harness daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI / curl ──▶ control API (axum) ──┬─▶ operation runner ──┐
//!                                       │                      ├─▶ timed client ──▶ backends
//!                                       │   health monitor ────┘
//!                                       │
//!                                       ├─▶ SDK operations ──▶ SdkCapability
//!                                       ├─▶ context store (JSON file)
//!                                       └─▶ result log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use backend_harness::client::ReqwestTransport;
use backend_harness::config::loader::load_config;
use backend_harness::config::HarnessConfig;
use backend_harness::lifecycle::{signals, Harness, Shutdown};
use backend_harness::observability::{logging, metrics};
use backend_harness::HarnessServer;

#[derive(Parser)]
#[command(name = "backend-harness")]
#[command(about = "Liveness monitor and operation runner for demo backends", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => HarnessConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "backend-harness starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        targets = config.targets.len(),
        interval_ms = config.health_check.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let harness = Arc::new(Harness::build(config, Arc::new(ReqwestTransport::new()))?);
    harness.start_monitor();

    let shutdown = Shutdown::new();
    let server = HarnessServer::new(harness.clone());
    let server_rx = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_rx).await?;
    harness.shutdown();

    tracing::info!("Shutdown complete");
    Ok(())
}
