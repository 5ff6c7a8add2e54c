//! Position list reader.
//!
//! Positions live in a markdown table maintained by hand, e.g.
//!
//! ```text
//! | Ticker | Entry | Stop Loss | Target | Status |
//! |--------|-------|-----------|--------|--------|
//! | AAPL   | 180   | 172.50    | 205    | active |
//! ```
//!
//! Columns are located by header name. Rows that cannot be understood are
//! skipped, never reported as errors.

use crate::models::Position;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PositionStoreError {
    #[error("failed to read positions from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Current positions. A store with no backing data returns an empty list.
    async fn list_positions(&self) -> Result<Vec<Position>, PositionStoreError>;
}

/// Fixed list, for tests and dry runs.
pub struct StaticPositionStore {
    positions: Vec<Position>,
}

impl StaticPositionStore {
    pub fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }
}

#[async_trait]
impl PositionStore for StaticPositionStore {
    async fn list_positions(&self) -> Result<Vec<Position>, PositionStoreError> {
        Ok(self.positions.clone())
    }
}

pub struct MarkdownPositionStore {
    path: PathBuf,
}

impl MarkdownPositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PositionStore for MarkdownPositionStore {
    async fn list_positions(&self) -> Result<Vec<Position>, PositionStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(parse_positions_table(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "positions file not found, no positions");
                Ok(Vec::new())
            }
            Err(e) => Err(PositionStoreError::Io {
                path: self.path.display().to_string(),
                source: e,
            }),
        }
    }
}

#[derive(Debug, Default)]
struct Columns {
    symbol: Option<usize>,
    stop_loss: Option<usize>,
    target: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn from_header(cells: &[String]) -> Option<Self> {
        let mut columns = Columns::default();
        for (i, cell) in cells.iter().enumerate() {
            let name = cell.to_lowercase();
            match name.as_str() {
                "symbol" | "ticker" => columns.symbol = Some(i),
                "stop" | "stop loss" | "stoploss" | "stop_loss" | "sl" => columns.stop_loss = Some(i),
                "target" | "take profit" | "tp" => columns.target = Some(i),
                "status" => columns.status = Some(i),
                _ => {}
            }
        }
        columns.symbol.map(|_| columns)
    }
}

fn split_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') {
        return None;
    }
    let inner = trimmed.trim_start_matches('|').trim_end_matches('|');
    Some(inner.split('|').map(|cell| cell.trim().to_string()).collect())
}

fn is_separator(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|cell| !cell.is_empty() && cell.chars().all(|c| matches!(c, '-' | ':' | ' ')))
}

/// Empty cells mean "not set"; anything else must parse or the row is dropped.
fn parse_level(cell: Option<&String>) -> Result<Option<f64>, ()> {
    let raw = match cell.map(|c| c.trim()) {
        None | Some("") | Some("-") => return Ok(None),
        Some(raw) => raw,
    };
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
        _ => Err(()),
    }
}

fn is_active(cell: Option<&String>) -> bool {
    match cell.map(|c| c.trim().to_lowercase()) {
        None => true,
        Some(status) => status.is_empty() || status == "active" || status == "open",
    }
}

/// Parse every position table in `contents`.
pub fn parse_positions_table(contents: &str) -> Vec<Position> {
    let mut positions = Vec::new();
    let mut columns: Option<Columns> = None;

    for line in contents.lines() {
        let cells = match split_row(line) {
            Some(cells) => cells,
            None => {
                columns = None;
                continue;
            }
        };

        if columns.is_none() {
            columns = Columns::from_header(&cells);
            continue;
        }
        let current = match &columns {
            Some(current) => current,
            None => continue,
        };

        if is_separator(&cells) {
            continue;
        }

        let symbol = current
            .symbol
            .and_then(|i| cells.get(i))
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default();
        if symbol.is_empty() {
            debug!(row = %line, "positions: row without symbol skipped");
            continue;
        }

        let stop_loss = parse_level(current.stop_loss.and_then(|i| cells.get(i)));
        let target = parse_level(current.target.and_then(|i| cells.get(i)));
        let (stop_loss, target) = match (stop_loss, target) {
            (Ok(stop_loss), Ok(target)) => (stop_loss, target),
            _ => {
                debug!(symbol = %symbol, row = %line, "positions: unparseable level, row skipped");
                continue;
            }
        };

        positions.push(Position {
            symbol,
            stop_loss,
            target,
            active: is_active(current.status.and_then(|i| cells.get(i))),
        });
    }

    positions
}
