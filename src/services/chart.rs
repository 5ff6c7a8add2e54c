//! Chart rendering through the external chart generator script.

use crate::models::AlertKind;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Render a chart for `symbol` framed for `kind`. `None` on any failure;
    /// alert emission never waits on a chart.
    async fn render(&self, symbol: &str, kind: AlertKind) -> Option<String>;
}

/// Used when no chart script is configured.
pub struct NoopChartRenderer;

#[async_trait]
impl ChartRenderer for NoopChartRenderer {
    async fn render(&self, _symbol: &str, _kind: AlertKind) -> Option<String> {
        None
    }
}

/// Runs `<interpreter> <script> SYMBOL KIND` and reads the saved path from
/// the `Chart saved: <path>` line.
pub struct ScriptChartRenderer {
    interpreter: String,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptChartRenderer {
    pub fn new(script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: "python3".to_string(),
            script: script.into(),
            timeout,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

/// Extract the chart path from the generator's stdout.
pub fn parse_chart_path(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Chart saved:")?.trim();
        // The generator appends the file size in parentheses.
        let path = match rest.rfind(" (") {
            Some(idx) => &rest[..idx],
            None => rest,
        };
        let path = path.trim();
        (!path.is_empty()).then(|| path.to_string())
    })
}

#[async_trait]
impl ChartRenderer for ScriptChartRenderer {
    async fn render(&self, symbol: &str, kind: AlertKind) -> Option<String> {
        let timeframe = kind.chart_timeframe();
        debug!(
            symbol = %symbol,
            kind = %kind,
            period = timeframe.period,
            interval = timeframe.interval,
            "ChartRenderer: rendering {} chart for {}",
            kind,
            symbol
        );

        let mut command = Command::new(&self.interpreter);
        command.arg(&self.script).arg(symbol).arg(kind.as_str()).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(symbol = %symbol, error = %e, "ChartRenderer: failed to start chart script");
                return None;
            }
            Err(_) => {
                warn!(
                    symbol = %symbol,
                    timeout_secs = self.timeout.as_secs(),
                    "ChartRenderer: chart script timed out"
                );
                return None;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                symbol = %symbol,
                status = %output.status,
                stderr = %stderr.trim(),
                "ChartRenderer: chart script failed"
            );
            return None;
        }

        let path = parse_chart_path(&String::from_utf8_lossy(&output.stdout));
        if path.is_none() {
            warn!(symbol = %symbol, "ChartRenderer: chart script reported no saved chart");
        }
        path
    }
}
