//! Marketwatch Monitor
//!
//! Long-running daemon: scans the watchlist on a fixed interval during
//! market hours, writes alert batches to the alert log and serves
//! `/health` and `/metrics`.

use dotenvy::dotenv;
use marketwatch::config::{self, MonitorConfig};
use marketwatch::core::context::{build_context, build_gate};
use marketwatch::core::http::{start_server, AppState};
use marketwatch::core::orchestrator::CycleOrchestrator;
use marketwatch::core::scheduler::ScanScheduler;
use marketwatch::logging;
use marketwatch::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = config::get_environment();
    info!("Starting Marketwatch Monitor");
    info!(environment = %env, "Environment");

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(symbols = ?config.symbols, "Watchlist: {}", config.symbols.join(", "));
    info!(
        interval = config.scan_interval_seconds,
        "Scan interval: every {} seconds", config.scan_interval_seconds
    );
    match &config.session {
        Some(session) => info!(
            open = %session.open,
            close = %session.close,
            utc_offset_minutes = session.utc_offset_minutes,
            "Market hours gate enabled"
        ),
        None => info!("No market hours configured, scanning around the clock"),
    }

    let metrics = Arc::new(Metrics::new()?);
    let gate = build_gate(&config)?;
    let context = build_context(&config)?.with_metrics(metrics.clone());
    let orchestrator = Arc::new(Mutex::new(CycleOrchestrator::from_config(&config, context)));
    let scheduler = ScanScheduler::new(orchestrator, gate, config.scan_interval_seconds)?
        .with_metrics(metrics.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = if config.port > 0 {
        let state = AppState::new(metrics, config.symbols.len(), config.scan_interval_seconds);
        let port = config.port;
        Some(tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = start_server(port, state, shutdown).await {
                error!(error = %e, "HTTP server error");
            }
        }))
    } else {
        None
    };

    scheduler.start().await?;

    info!("Monitor started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down monitor...");
    scheduler.stop().await;
    let _ = shutdown_tx.send(());
    if let Some(server) = server {
        if let Err(e) = server.await {
            error!(error = %e, "HTTP server task failed");
        }
    }
    info!("Monitor stopped");

    Ok(())
}
