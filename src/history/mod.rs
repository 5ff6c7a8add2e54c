//! Per-instrument price history.
//!
//! The store owns the only long-lived time-series state: closing prices
//! (oldest first), the trailing average volume from the last refresh, and
//! when that refresh happened.

use crate::models::HistoricalBar;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    closes: Vec<f64>,
    avg_volume: Option<f64>,
    refreshed_at: Option<DateTime<Utc>>,
    last_bar_at: Option<DateTime<Utc>>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self {
            closes: Vec::new(),
            avg_volume: None,
            refreshed_at: None,
            last_bar_at: None,
        }
    }

    /// Build directly from closes, e.g. for tests or replay.
    pub fn from_closes(closes: Vec<f64>, avg_volume: Option<f64>) -> Self {
        Self {
            closes,
            avg_volume,
            refreshed_at: None,
            last_bar_at: None,
        }
    }

    /// Replace the whole series with freshly fetched bars.
    ///
    /// The trailing average volume covers the most recent `volume_period`
    /// bars and is unavailable with fewer bars or a zero mean.
    pub fn replace(&mut self, bars: &[HistoricalBar], volume_period: usize, now: DateTime<Utc>) {
        self.closes = bars
            .iter()
            .map(|bar| bar.close)
            .filter(|close| close.is_finite())
            .collect();
        self.avg_volume = trailing_average_volume(bars, volume_period);
        self.refreshed_at = Some(now);
        self.last_bar_at = bars
            .iter()
            .rev()
            .find(|bar| bar.close.is_finite())
            .map(|bar| bar.timestamp);
    }

    /// Fold a live close into freshly replaced history.
    ///
    /// When the newest bar falls on the same UTC date as `at` it is the
    /// in-progress session, so its close is overwritten; otherwise the close
    /// is appended as a new session.
    pub fn merge_close(&mut self, close: f64, at: DateTime<Utc>) {
        if !close.is_finite() {
            return;
        }
        let same_session = self
            .last_bar_at
            .is_some_and(|last| last.date_naive() == at.date_naive());
        match self.closes.last_mut() {
            Some(last) if same_session => *last = close,
            _ => {
                self.closes.push(close);
                self.last_bar_at = Some(at);
            }
        }
    }

    pub fn append_close(&mut self, close: f64) {
        if close.is_finite() {
            self.closes.push(close);
        }
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn avg_volume(&self) -> Option<f64> {
        self.avg_volume
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// True when never refreshed or the last refresh is at least `max_age` old.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.refreshed_at {
            Some(at) => now - at >= max_age,
            None => true,
        }
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}

fn trailing_average_volume(bars: &[HistoricalBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let recent = &bars[bars.len() - period..];
    let avg = recent.iter().map(|bar| bar.volume).sum::<f64>() / period as f64;
    if avg > 0.0 && avg.is_finite() {
        Some(avg)
    } else {
        None
    }
}

/// Histories keyed by symbol.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: HashMap<String, PriceHistory>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceHistory> {
        self.entries.get(symbol)
    }

    pub fn entry(&mut self, symbol: &str) -> &mut PriceHistory {
        self.entries.entry(symbol.to_string()).or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
