//! Alert value objects and their serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of event an alert reports. Doubles as the dedup key component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    PriceChange,
    VolumeSpike,
    Rsi,
    MaCross,
    NearStopLoss,
    NearTarget,
}

impl AlertKind {
    pub const ALL: [AlertKind; 6] = [
        AlertKind::NearStopLoss,
        AlertKind::NearTarget,
        AlertKind::MaCross,
        AlertKind::VolumeSpike,
        AlertKind::Rsi,
        AlertKind::PriceChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::PriceChange => "priceChange",
            AlertKind::VolumeSpike => "volumeSpike",
            AlertKind::Rsi => "rsi",
            AlertKind::MaCross => "maCross",
            AlertKind::NearStopLoss => "nearStopLoss",
            AlertKind::NearTarget => "nearTarget",
        }
    }

    /// Chart window that best shows this kind of event.
    pub fn chart_timeframe(&self) -> ChartTimeframe {
        match self {
            AlertKind::NearStopLoss => ChartTimeframe::new("1d", "5m", "Precise recent action"),
            AlertKind::NearTarget => ChartTimeframe::new("1d", "5m", "Approaching target"),
            AlertKind::MaCross => ChartTimeframe::new("3mo", "1d", "Trend context for the crossover"),
            AlertKind::VolumeSpike => ChartTimeframe::new("5d", "1h", "Spike relative to recent sessions"),
            AlertKind::Rsi => ChartTimeframe::new("3mo", "1d", "Broader context for RSI extremes"),
            AlertKind::PriceChange => ChartTimeframe::new("1d", "15m", "Intraday move structure"),
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown alert kind: {0}")]
pub struct ParseAlertKindError(pub String);

impl FromStr for AlertKind {
    type Err = ParseAlertKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AlertKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseAlertKindError(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartTimeframe {
    pub period: &'static str,
    pub interval: &'static str,
    pub reason: &'static str,
}

impl ChartTimeframe {
    const fn new(period: &'static str, interval: &'static str, reason: &'static str) -> Self {
        Self {
            period,
            interval,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Flat payload field: numbers stay numeric, formatted figures are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Number(f64),
    Text(String),
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        PayloadValue::Number(value)
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        PayloadValue::Number(value as f64)
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Text(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Text(value.to_string())
    }
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Number(n) => write!(f, "{}", n),
            PayloadValue::Text(s) => f.write_str(s),
        }
    }
}

pub type Payload = BTreeMap<String, PayloadValue>;

/// Two-decimal rendering used for every formatted payload figure.
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub payload: Payload,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        symbol: impl Into<String>,
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            payload: Payload::new(),
            symbol: symbol.into(),
            timestamp,
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<PayloadValue>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&PayloadValue> {
        self.payload.get(key)
    }
}

/// Status stamped on emitted batches; consumers move it forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
        }
    }
}

/// What an alert sink receives for one instrument in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertBatch {
    pub symbol: String,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
}

impl AlertBatch {
    pub fn new(symbol: impl Into<String>, alerts: Vec<Alert>, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            alerts,
            chart: None,
            timestamp,
            status: AlertStatus::Pending,
        }
    }

    pub fn with_chart(mut self, chart: Option<String>) -> Self {
        self.chart = chart;
        self
    }

    /// Kind of the highest-ranked alert, used to pick the chart timeframe.
    pub fn dominant_kind(&self) -> Option<AlertKind> {
        self.alerts.first().map(|a| a.kind)
    }
}
