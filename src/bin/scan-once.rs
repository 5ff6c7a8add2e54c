//! Run a single scan cycle and print the emitted batches as JSON.
//!
//! Ignores market hours. With `--dry-run` batches are only printed, not
//! appended to the alert log.

use dotenvy::dotenv;
use marketwatch::config::MonitorConfig;
use marketwatch::core::context::build_context;
use marketwatch::core::orchestrator::CycleOrchestrator;
use marketwatch::logging;
use marketwatch::services::MemoryAlertSink;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");
    let config = MonitorConfig::from_env()?;

    let mut context = build_context(&config)?;
    if dry_run {
        context.sink = Arc::new(MemoryAlertSink::new());
    }

    let mut orchestrator = CycleOrchestrator::from_config(&config, context);
    let report = orchestrator.run_cycle(chrono::Utc::now()).await;

    for (symbol, e) in &report.failures {
        warn!(symbol = %symbol, error = %e, "Skipped {}", symbol);
    }
    info!(
        evaluated = report.evaluated,
        alerts = report.alert_count(),
        dry_run = dry_run,
        "Scan complete"
    );
    println!("{}", serde_json::to_string_pretty(&report.emitted)?);

    Ok(())
}
