//! Cron-based scheduler that drives scan cycles

use crate::core::orchestrator::CycleOrchestrator;
use crate::metrics::Metrics;
use crate::services::MarketHoursGate;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("scheduler already running")]
    AlreadyRunning,

    #[error("interval of {seconds}s does not divide a minute, hour or day evenly")]
    UnevenInterval { seconds: u64 },
}

/// Cron expression (with seconds field) firing every `interval_seconds`.
///
/// `*/N` restarts at each minute, hour or day boundary, so only intervals
/// that divide that boundary evenly map to a fixed spacing; anything else
/// yields `None`.
pub fn interval_to_cron(interval_seconds: u64) -> Option<String> {
    match interval_seconds {
        0 => None,
        s if s < 60 => (60 % s == 0).then(|| format!("*/{} * * * * *", s)),
        s if s < 3600 => {
            let minutes = s / 60;
            (s % 60 == 0 && 60 % minutes == 0).then(|| format!("0 */{} * * * *", minutes))
        }
        86_400 => Some("0 0 0 * * *".to_string()),
        s => {
            let hours = s / 3600;
            (s % 3600 == 0 && 24 % hours == 0).then(|| format!("0 0 */{} * * *", hours))
        }
    }
}

/// Runs the orchestrator on every cron tick while the market is open.
///
/// A cycle is awaited inside the loop, so an overrunning cycle delays the
/// next tick instead of overlapping with it.
pub struct ScanScheduler {
    orchestrator: Arc<Mutex<CycleOrchestrator>>,
    gate: Arc<dyn MarketHoursGate>,
    schedule: Schedule,
    metrics: Option<Arc<Metrics>>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `orchestrator` - Cycle driver, shared so callers can inspect state
    /// * `gate` - Decides whether a tick runs or is skipped
    /// * `interval_seconds` - Scan interval in seconds (0 = disabled)
    pub fn new(
        orchestrator: Arc<Mutex<CycleOrchestrator>>,
        gate: Arc<dyn MarketHoursGate>,
        interval_seconds: u64,
    ) -> Result<Self, SchedulerError> {
        if interval_seconds == 0 {
            return Err(SchedulerError::Disabled);
        }

        let cron_expr = interval_to_cron(interval_seconds).ok_or(SchedulerError::UnevenInterval {
            seconds: interval_seconds,
        })?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.clone(),
            reason: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "ScanScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            orchestrator,
            gate,
            schedule,
            metrics: None,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut slot = self.handle.write().await;
        if slot.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let orchestrator = self.orchestrator.clone();
        let gate = self.gate.clone();
        let schedule = self.schedule.clone();
        let metrics = self.metrics.clone();

        let handle = tokio::spawn(async move {
            info!("ScanScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                let now = chrono::Utc::now();
                if let Some(metrics) = &metrics {
                    metrics.last_tick_timestamp.set(now.timestamp());
                }
                if !gate.is_open(now) {
                    debug!(at = %now, "ScanScheduler: market closed, skipping tick");
                    if let Some(metrics) = &metrics {
                        metrics.cycles_skipped_total.inc();
                    }
                    continue;
                }

                let mut orchestrator = orchestrator.lock().await;
                info!(
                    symbol_count = orchestrator.symbols().len(),
                    "ScanScheduler: cron tick, scanning {} symbols",
                    orchestrator.symbols().len()
                );
                let report = orchestrator.run_cycle(now).await;
                if !report.failures.is_empty() {
                    warn!(
                        failures = report.failures.len(),
                        "ScanScheduler: cycle finished with {} skipped instruments",
                        report.failures.len()
                    );
                }
            }
        });

        *slot = Some(handle);
        info!("ScanScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler. A cycle in progress is abandoned at its next
    /// await point.
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("ScanScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
