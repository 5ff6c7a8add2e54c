use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::math;

/// Point-in-time snapshot for one instrument, fixed for the cycle it was captured in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub previous_close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Quote with session fields collapsed onto `price`; handy for feeds that
    /// only report last and previous close.
    pub fn new(symbol: impl Into<String>, price: f64, previous_close: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            open: price,
            high: price,
            low: price,
            volume,
            previous_close,
            vwap: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_session(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = open;
        self.high = high;
        self.low = low;
        self
    }

    pub fn with_vwap(mut self, vwap: f64) -> Self {
        self.vwap = Some(vwap);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Percent change from the previous session close.
    pub fn change_pct(&self) -> Option<f64> {
        math::percent_change(self.price, self.previous_close)
    }
}

/// One daily bar from the historical feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl HistoricalBar {
    pub fn new(close: f64, volume: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            close,
            volume,
            timestamp,
        }
    }
}
