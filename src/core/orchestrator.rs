//! One evaluation pass over every configured instrument.

use crate::config::MonitorConfig;
use crate::core::context::CycleContext;
use crate::models::{AlertBatch, Position, Quote};
use crate::services::{MarketDataError, SinkError};
use crate::signals::{EngineState, SignalEngine};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why one instrument was skipped this cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("no quote returned for {symbol}")]
    MissingQuote { symbol: String },

    #[error("snapshot fetch failed: {0}")]
    Snapshot(#[source] MarketDataError),

    #[error("history refresh failed for {symbol}: {source}")]
    History {
        symbol: String,
        #[source]
        source: MarketDataError,
    },

    #[error("alert sink rejected batch for {symbol}: {source}")]
    Sink {
        symbol: String,
        #[source]
        source: SinkError,
    },
}

/// History maintenance knobs.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub history_refresh: Duration,
    pub history_lookback_days: u32,
    pub volume_avg_period: usize,
    pub fetch_timeout: std::time::Duration,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            history_refresh: Duration::hours(1),
            history_lookback_days: 300,
            volume_avg_period: 20,
            fetch_timeout: std::time::Duration::from_secs(10),
        }
    }
}

impl CycleSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            history_refresh: config.history_refresh,
            history_lookback_days: config.history_lookback_days,
            volume_avg_period: config.volume_avg_period,
            fetch_timeout: std::time::Duration::from_secs(config.fetch_timeout_seconds.max(1)),
        }
    }
}

/// Outcome of one cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub evaluated: usize,
    pub emitted: Vec<AlertBatch>,
    pub failures: Vec<(String, CycleError)>,
}

impl CycleReport {
    pub fn alert_count(&self) -> usize {
        self.emitted.iter().map(|b| b.alerts.len()).sum()
    }
}

pub struct CycleOrchestrator {
    symbols: Vec<String>,
    settings: CycleSettings,
    engine: SignalEngine,
    state: EngineState,
    context: CycleContext,
}

impl CycleOrchestrator {
    pub fn new(
        symbols: Vec<String>,
        settings: CycleSettings,
        engine: SignalEngine,
        context: CycleContext,
    ) -> Self {
        Self {
            symbols,
            settings,
            engine,
            state: EngineState::new(),
            context,
        }
    }

    pub fn from_config(config: &MonitorConfig, context: CycleContext) -> Self {
        Self::new(
            config.symbols.clone(),
            CycleSettings::from_config(config),
            SignalEngine::new(config.thresholds.clone(), config.selection.clone()),
            context,
        )
    }

    /// Start from existing state instead of an empty one.
    pub fn with_state(mut self, state: EngineState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Run every instrument once. Failures are isolated per instrument and
    /// collected in the report; nothing here aborts the cycle.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let quotes = match self.fetch_snapshots().await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(error = %e, symbols = self.symbols.len(), "Cycle: snapshot fetch failed, skipping cycle");
                for symbol in &self.symbols {
                    report.failures.push((symbol.clone(), CycleError::Snapshot(clone_error(&e))));
                }
                self.record_cycle(&report, started, now);
                return report;
            }
        };

        let positions = match self.context.positions.list_positions().await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "Cycle: position store unavailable, evaluating without positions");
                Vec::new()
            }
        };

        let symbols = self.symbols.clone();
        for symbol in &symbols {
            match self.process_instrument(symbol, quotes.get(symbol), &positions, now).await {
                Ok(batch) => {
                    report.evaluated += 1;
                    if let Some(batch) = batch {
                        report.emitted.push(batch);
                    }
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Cycle: skipping {} this cycle", symbol);
                    report.failures.push((symbol.clone(), e));
                }
            }
        }

        info!(
            evaluated = report.evaluated,
            batches = report.emitted.len(),
            alerts = report.alert_count(),
            failures = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Cycle: complete"
        );
        self.record_cycle(&report, started, now);
        report
    }

    async fn fetch_snapshots(&self) -> Result<HashMap<String, Quote>, MarketDataError> {
        let timeout = self.settings.fetch_timeout;
        match tokio::time::timeout(timeout, self.context.market_data.get_snapshots(&self.symbols)).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                seconds: timeout.as_secs(),
            }),
        }
    }

    async fn refresh_history(&mut self, symbol: &str, now: DateTime<Utc>) -> Result<(), CycleError> {
        let timeout = self.settings.fetch_timeout;
        let fetch = self
            .context
            .market_data
            .get_daily_history(symbol, self.settings.history_lookback_days);
        let bars = match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                seconds: timeout.as_secs(),
            }),
        }
        .map_err(|source| CycleError::History {
            symbol: symbol.to_string(),
            source,
        })?;

        let history = self.state.history.entry(symbol);
        history.replace(&bars, self.settings.volume_avg_period, now);
        debug!(
            symbol = %symbol,
            closes = history.len(),
            avg_volume = ?history.avg_volume(),
            "Cycle: refreshed history for {}",
            symbol
        );
        Ok(())
    }

    async fn process_instrument(
        &mut self,
        symbol: &str,
        quote: Option<&Quote>,
        positions: &[Position],
        now: DateTime<Utc>,
    ) -> Result<Option<AlertBatch>, CycleError> {
        let quote = quote.ok_or_else(|| CycleError::MissingQuote {
            symbol: symbol.to_string(),
        })?;

        if self.state.history.entry(symbol).is_stale(now, self.settings.history_refresh) {
            self.refresh_history(symbol, now).await?;
            self.state
                .history
                .entry(symbol)
                .merge_close(quote.price, quote.timestamp);
        } else {
            self.state.history.entry(symbol).append_close(quote.price);
        }

        let EngineState { history, ledger } = &mut self.state;
        let history = history.entry(symbol);
        let outcome = self.engine.evaluate(quote, history, positions, ledger, now);

        if let Some(metrics) = &self.context.metrics {
            metrics.alerts_suppressed_total.inc_by(outcome.suppressed as u64);
            metrics.alerts_truncated_total.inc_by(outcome.truncated as u64);
        }
        if outcome.suppressed > 0 || outcome.truncated > 0 {
            debug!(
                symbol = %symbol,
                suppressed = outcome.suppressed,
                truncated = outcome.truncated,
                "Cycle: {} suppressed, {} truncated for {}",
                outcome.suppressed,
                outcome.truncated,
                symbol
            );
        }

        if outcome.selected.is_empty() {
            return Ok(None);
        }

        let mut batch = AlertBatch::new(symbol, outcome.selected, now);
        if let Some(kind) = batch.dominant_kind() {
            let chart = self.context.charts.render(symbol, kind).await;
            batch = batch.with_chart(chart);
        }

        self.context
            .sink
            .emit(&batch)
            .await
            .map_err(|source| CycleError::Sink {
                symbol: symbol.to_string(),
                source,
            })?;

        if let Some(metrics) = &self.context.metrics {
            for alert in &batch.alerts {
                metrics
                    .alerts_emitted_total
                    .with_label_values(&[alert.kind.as_str()])
                    .inc();
            }
        }
        info!(
            symbol = %symbol,
            alerts = batch.alerts.len(),
            top_kind = ?batch.dominant_kind(),
            chart = ?batch.chart,
            "Cycle: emitted {} alerts for {}",
            batch.alerts.len(),
            symbol
        );
        Ok(Some(batch))
    }

    fn record_cycle(&self, report: &CycleReport, started: Instant, now: DateTime<Utc>) {
        if let Some(metrics) = &self.context.metrics {
            metrics.cycles_total.inc();
            metrics
                .cycle_duration_seconds
                .observe(started.elapsed().as_secs_f64());
            metrics
                .instrument_failures_total
                .inc_by(report.failures.len() as u64);
            metrics.last_cycle_timestamp.set(now.timestamp());
        }
    }
}

/// `MarketDataError` holds no non-clonable sources, so one failure can be
/// attributed to every symbol in the batch.
fn clone_error(e: &MarketDataError) -> MarketDataError {
    match e {
        MarketDataError::NetworkUnreachable(msg) => MarketDataError::NetworkUnreachable(msg.clone()),
        MarketDataError::Http { status } => MarketDataError::Http { status: *status },
        MarketDataError::ResponseFormatChanged(msg) => MarketDataError::ResponseFormatChanged(msg.clone()),
        MarketDataError::SymbolNotFound { symbol } => MarketDataError::SymbolNotFound {
            symbol: symbol.clone(),
        },
        MarketDataError::Timeout { seconds } => MarketDataError::Timeout { seconds: *seconds },
    }
}
