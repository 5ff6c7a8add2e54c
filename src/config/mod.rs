//! Environment-driven configuration.
//!
//! Values come from the process environment (optionally seeded from `.env`
//! by the binaries). Everything is validated once at startup; a
//! `ConfigError` means the daemon must not start.

use crate::models::AlertKind;
use chrono::{Duration, NaiveTime};
use std::env;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MARKET_DATA_URL: &str = "https://query1.finance.yahoo.com";

/// A UTC offset must stay under one day.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60;

/// Upper bound for dedup and history refresh windows (one year).
pub const MAX_WINDOW_SECONDS: i64 = 366 * 24 * 60 * 60;

fn window_seconds<S>(source: &S, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    S: SettingSource + ?Sized,
{
    let secs: i64 = parse_or(source, key, default)?;
    if !(0..=MAX_WINDOW_SECONDS).contains(&secs) {
        return Err(ConfigError::invalid(
            key,
            secs,
            format!("must lie within 0..={}", MAX_WINDOW_SECONDS),
        ));
    }
    Ok(secs)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Deployment environment name (`APP_ENV`, default `sandbox`)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Source of raw setting values. The process environment in production,
/// a map in tests.
pub trait SettingSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl SettingSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl SettingSource for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        self.get(key).cloned().filter(|v| !v.trim().is_empty())
    }
}

fn parse_or<T, S>(source: &S, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    S: SettingSource + ?Sized,
{
    match source.get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, &raw, e.to_string())),
        None => Ok(default),
    }
}

fn parse_time<S>(source: &S, key: &'static str, default: NaiveTime) -> Result<NaiveTime, ConfigError>
where
    S: SettingSource + ?Sized,
{
    match source.get(key) {
        Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|e| ConfigError::invalid(key, &raw, e.to_string())),
        None => Ok(default),
    }
}

/// Rule parameters. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    pub price_change_pct: f64,
    pub volume_spike_multiplier: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub ema_short: u32,
    pub ema_long: u32,
    pub sma_short: u32,
    pub sma_long: u32,
    pub near_stop_loss_pct: f64,
    pub near_target_pct: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            price_change_pct: 2.0,
            volume_spike_multiplier: 2.0,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            ema_short: 9,
            ema_long: 21,
            sma_short: 50,
            sma_long: 200,
            near_stop_loss_pct: 2.0,
            near_target_pct: 2.0,
        }
    }
}

impl ThresholdConfig {
    pub fn from_source<S: SettingSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            price_change_pct: parse_or(source, "PRICE_CHANGE_PCT", defaults.price_change_pct)?,
            volume_spike_multiplier: parse_or(
                source,
                "VOLUME_SPIKE_MULTIPLIER",
                defaults.volume_spike_multiplier,
            )?,
            rsi_overbought: parse_or(source, "RSI_OVERBOUGHT", defaults.rsi_overbought)?,
            rsi_oversold: parse_or(source, "RSI_OVERSOLD", defaults.rsi_oversold)?,
            ema_short: parse_or(source, "EMA_SHORT", defaults.ema_short)?,
            ema_long: parse_or(source, "EMA_LONG", defaults.ema_long)?,
            sma_short: parse_or(source, "SMA_SHORT", defaults.sma_short)?,
            sma_long: parse_or(source, "SMA_LONG", defaults.sma_long)?,
            near_stop_loss_pct: parse_or(source, "NEAR_STOP_LOSS_PCT", defaults.near_stop_loss_pct)?,
            near_target_pct: parse_or(source, "NEAR_TARGET_PCT", defaults.near_target_pct)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("PRICE_CHANGE_PCT", self.price_change_pct),
            ("VOLUME_SPIKE_MULTIPLIER", self.volume_spike_multiplier),
            ("NEAR_STOP_LOSS_PCT", self.near_stop_loss_pct),
            ("NEAR_TARGET_PCT", self.near_target_pct),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(key, value, "must be a positive number"));
            }
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold) || !(0.0..=100.0).contains(&self.rsi_overbought) {
            return Err(ConfigError::invalid(
                "RSI_OVERBOUGHT",
                self.rsi_overbought,
                "RSI levels must lie within 0..=100",
            ));
        }
        if self.rsi_overbought <= self.rsi_oversold {
            return Err(ConfigError::invalid(
                "RSI_OVERBOUGHT",
                self.rsi_overbought,
                format!("must exceed RSI_OVERSOLD ({})", self.rsi_oversold),
            ));
        }
        if self.ema_short == 0 || self.ema_short >= self.ema_long {
            return Err(ConfigError::invalid(
                "EMA_SHORT",
                self.ema_short,
                format!("must be non-zero and below EMA_LONG ({})", self.ema_long),
            ));
        }
        if self.sma_short == 0 || self.sma_short >= self.sma_long {
            return Err(ConfigError::invalid(
                "SMA_SHORT",
                self.sma_short,
                format!("must be non-zero and below SMA_LONG ({})", self.sma_long),
            ));
        }
        Ok(())
    }
}

/// Dedup window, per-symbol cap and kind ranking for the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub dedup_window: Duration,
    pub max_alerts: usize,
    pub priority: Vec<AlertKind>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::hours(1),
            max_alerts: 3,
            priority: AlertKind::ALL.to_vec(),
        }
    }
}

impl SelectionConfig {
    pub fn from_source<S: SettingSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let window_secs = window_seconds(source, "DEDUP_WINDOW_SECONDS", 3600)?;
        let max_alerts: usize = parse_or(source, "MAX_ALERTS_PER_SYMBOL", 3)?;
        if max_alerts == 0 {
            return Err(ConfigError::invalid("MAX_ALERTS_PER_SYMBOL", 0, "must be at least 1"));
        }
        let priority = match source.get("ALERT_PRIORITY") {
            Some(raw) => parse_priority(&raw)?,
            None => AlertKind::ALL.to_vec(),
        };
        Ok(Self {
            dedup_window: Duration::seconds(window_secs),
            max_alerts,
            priority,
        })
    }
}

/// Parse a comma-separated kind ranking, highest priority first.
pub fn parse_priority(raw: &str) -> Result<Vec<AlertKind>, ConfigError> {
    let mut priority = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: AlertKind = item
            .parse()
            .map_err(|e: crate::models::ParseAlertKindError| {
                ConfigError::invalid("ALERT_PRIORITY", raw, e.to_string())
            })?;
        if !priority.contains(&kind) {
            priority.push(kind);
        }
    }
    if priority.is_empty() {
        return Err(ConfigError::invalid("ALERT_PRIORITY", raw, "no alert kinds listed"));
    }
    Ok(priority)
}

/// Trading session window at a fixed UTC offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub utc_offset_minutes: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            utc_offset_minutes: -300,
        }
    }
}

/// Full daemon configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub symbols: Vec<String>,
    pub scan_interval_seconds: u64,
    pub history_refresh: Duration,
    pub history_lookback_days: u32,
    pub volume_avg_period: usize,
    pub fetch_timeout_seconds: u64,
    pub thresholds: ThresholdConfig,
    pub selection: SelectionConfig,
    pub session: Option<SessionConfig>,
    pub market_data_url: String,
    pub positions_file: String,
    pub alerts_file: String,
    pub chart_script: Option<String>,
    pub chart_timeout_seconds: u64,
    pub port: u16,
}

impl MonitorConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source<S: SettingSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let raw_symbols = source.get("WATCHLIST").ok_or(ConfigError::Missing("WATCHLIST"))?;
        let mut symbols: Vec<String> = Vec::new();
        for symbol in raw_symbols
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
        {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        if symbols.is_empty() {
            return Err(ConfigError::Missing("WATCHLIST"));
        }

        // The scheduler further requires an interval that divides a minute,
        // hour or day evenly.
        let scan_interval_seconds: u64 = parse_or(source, "SCAN_INTERVAL_SECONDS", 300)?;
        if scan_interval_seconds == 0 {
            return Err(ConfigError::invalid("SCAN_INTERVAL_SECONDS", 0, "must be > 0"));
        }
        let refresh_secs = window_seconds(source, "HISTORY_REFRESH_SECONDS", 3600)?;
        let history_lookback_days: u32 = parse_or(source, "HISTORY_LOOKBACK_DAYS", 300)?;
        let volume_avg_period: usize = parse_or(source, "VOLUME_AVG_PERIOD", 20)?;
        if volume_avg_period == 0 {
            return Err(ConfigError::invalid("VOLUME_AVG_PERIOD", 0, "must be > 0"));
        }

        let session = if source.get("MARKET_OPEN").is_some() || source.get("MARKET_CLOSE").is_some() {
            let defaults = SessionConfig::default();
            let session = SessionConfig {
                open: parse_time(source, "MARKET_OPEN", defaults.open)?,
                close: parse_time(source, "MARKET_CLOSE", defaults.close)?,
                utc_offset_minutes: parse_or(
                    source,
                    "MARKET_UTC_OFFSET_MINUTES",
                    defaults.utc_offset_minutes,
                )?,
            };
            if !(1 - MAX_UTC_OFFSET_MINUTES..MAX_UTC_OFFSET_MINUTES).contains(&session.utc_offset_minutes) {
                return Err(ConfigError::invalid(
                    "MARKET_UTC_OFFSET_MINUTES",
                    session.utc_offset_minutes,
                    format!("must lie strictly between -{0} and {0}", MAX_UTC_OFFSET_MINUTES),
                ));
            }
            if session.open >= session.close {
                return Err(ConfigError::invalid(
                    "MARKET_OPEN",
                    session.open,
                    "must be before MARKET_CLOSE",
                ));
            }
            Some(session)
        } else {
            None
        };

        Ok(Self {
            symbols,
            scan_interval_seconds,
            history_refresh: Duration::seconds(refresh_secs),
            history_lookback_days,
            volume_avg_period,
            fetch_timeout_seconds: parse_or(source, "FETCH_TIMEOUT_SECONDS", 10)?,
            thresholds: ThresholdConfig::from_source(source)?,
            selection: SelectionConfig::from_source(source)?,
            session,
            market_data_url: source
                .get("MARKET_DATA_URL")
                .unwrap_or_else(|| DEFAULT_MARKET_DATA_URL.to_string()),
            positions_file: source
                .get("POSITIONS_FILE")
                .unwrap_or_else(|| "shared/positions.md".to_string()),
            alerts_file: source
                .get("ALERTS_FILE")
                .unwrap_or_else(|| "shared/alerts.md".to_string()),
            chart_script: source.get("CHART_SCRIPT"),
            chart_timeout_seconds: parse_or(source, "CHART_TIMEOUT_SECONDS", 60)?,
            port: parse_or(source, "PORT", 0)?,
        })
    }
}
