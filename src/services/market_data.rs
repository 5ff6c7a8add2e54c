//! Market data provider interface.

use crate::models::{HistoricalBar, Quote};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Recoverable failure of a single provider call. The caller skips the
/// affected instrument(s) and the next cycle retries.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from market data provider")]
    Http { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current quotes for all `symbols` in one call. Symbols the source does
    /// not know are simply absent from the map.
    async fn get_snapshots(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, MarketDataError>;

    /// Daily bars covering roughly `lookback_days`, oldest first.
    async fn get_daily_history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<HistoricalBar>, MarketDataError>;
}
