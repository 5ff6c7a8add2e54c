//! Alert sinks. Append-only; batches land in the order they are emitted.

use crate::models::AlertBatch;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write alerts to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize alert batch: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit(&self, batch: &AlertBatch) -> Result<(), SinkError>;
}

/// Appends one markdown section per batch, with the batch as a fenced JSON
/// block for machine readers.
pub struct MarkdownAlertSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MarkdownAlertSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Markdown section for one batch.
pub fn render_batch(batch: &AlertBatch) -> Result<String, SinkError> {
    let mut out = format!(
        "## {} | {} | {}\n\n",
        batch.symbol,
        batch.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        batch.status.as_str()
    );
    for alert in &batch.alerts {
        out.push_str(&format!("- **{}** `{}` {}\n", alert.severity, alert.kind, alert.message));
    }
    if let Some(chart) = &batch.chart {
        out.push_str(&format!("\nChart: `{}`\n", chart));
    }
    out.push_str(&format!("\n```json\n{}\n```\n\n", serde_json::to_string_pretty(batch)?));
    Ok(out)
}

#[async_trait]
impl AlertSink for MarkdownAlertSink {
    async fn emit(&self, batch: &AlertBatch) -> Result<(), SinkError> {
        let section = render_batch(batch)?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(section.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Keeps batches in memory; used by `scan-once` and tests.
#[derive(Default)]
pub struct MemoryAlertSink {
    batches: Mutex<Vec<AlertBatch>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batches(&self) -> Vec<AlertBatch> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl AlertSink for MemoryAlertSink {
    async fn emit(&self, batch: &AlertBatch) -> Result<(), SinkError> {
        self.batches.lock().await.push(batch.clone());
        Ok(())
    }
}
