//! Collaborators handed to the cycle orchestrator.

use crate::config::{ConfigError, MonitorConfig};
use crate::metrics::Metrics;
use crate::services::{
    AlertSink, AlwaysOpen, ChartRenderer, MarkdownAlertSink, MarkdownPositionStore,
    MarketDataError, MarketDataProvider, MarketHoursGate, NoopChartRenderer, PositionStore,
    ScriptChartRenderer, SessionGate, YahooMarketDataProvider,
};
use std::sync::Arc;
use std::time::Duration;

/// Everything a cycle talks to outside its own state.
///
/// Contains:
/// - Market data provider (quotes and daily bars)
/// - Position store (re-read every cycle)
/// - Chart renderer and alert sink (outbound)
/// - Metrics, when the daemon exports them
pub struct CycleContext {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub positions: Arc<dyn PositionStore>,
    pub charts: Arc<dyn ChartRenderer>,
    pub sink: Arc<dyn AlertSink>,
    pub metrics: Option<Arc<Metrics>>,
}

impl CycleContext {
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        positions: Arc<dyn PositionStore>,
        charts: Arc<dyn ChartRenderer>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            market_data,
            positions,
            charts,
            sink,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Production collaborators as configured: Yahoo quotes, the markdown
/// positions table, the chart script when set, and the markdown alert log.
pub fn build_context(config: &MonitorConfig) -> Result<CycleContext, MarketDataError> {
    let market_data = YahooMarketDataProvider::new(
        config.market_data_url.clone(),
        Duration::from_secs(config.fetch_timeout_seconds.max(1)),
    )?;

    let charts: Arc<dyn ChartRenderer> = match &config.chart_script {
        Some(script) => Arc::new(ScriptChartRenderer::new(
            script,
            Duration::from_secs(config.chart_timeout_seconds.max(1)),
        )),
        None => Arc::new(NoopChartRenderer),
    };

    Ok(CycleContext::new(
        Arc::new(market_data),
        Arc::new(MarkdownPositionStore::new(&config.positions_file)),
        charts,
        Arc::new(MarkdownAlertSink::new(&config.alerts_file)),
    ))
}

/// Session gate when market hours are configured, otherwise always open.
///
/// A configured session that cannot become a gate is an error rather than
/// an always-open fallback.
pub fn build_gate(config: &MonitorConfig) -> Result<Arc<dyn MarketHoursGate>, ConfigError> {
    let Some(session) = config.session.as_ref() else {
        return Ok(Arc::new(AlwaysOpen));
    };
    SessionGate::from_config(session)
        .map(|gate| Arc::new(gate) as Arc<dyn MarketHoursGate>)
        .ok_or_else(|| ConfigError::Invalid {
            key: "MARKET_UTC_OFFSET_MINUTES",
            value: session.utc_offset_minutes.to_string(),
            reason: "not a representable UTC offset".to_string(),
        })
}
