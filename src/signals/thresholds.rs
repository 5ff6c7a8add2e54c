//! Threshold rules evaluated against a quote and its price history.

use crate::config::ThresholdConfig;
use crate::history::PriceHistory;
use crate::indicators::{
    calculate_rsi, crossover_on_series, ema_pair, sma_pair, CrossoverType, DEFAULT_RSI_PERIOD,
};
use crate::models::{fixed2, Alert, AlertKind, AveragePair, Quote, Severity};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Realized volume multiple at which a spike is escalated to HIGH.
pub const VOLUME_SPIKE_HIGH_MULTIPLE: f64 = 3.0;

pub struct ThresholdEvaluator {
    config: ThresholdConfig,
}

impl ThresholdEvaluator {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Run every rule in a fixed order. `history` must already include the
    /// quote's price as its last close.
    pub fn evaluate(&self, quote: &Quote, history: &PriceHistory, now: DateTime<Utc>) -> Vec<Alert> {
        let symbol = quote.symbol.as_str();
        let closes = history.closes();
        let mut alerts = Vec::new();

        if let Some(alert) = self.price_change(quote, now) {
            alerts.push(alert);
        }
        if let Some(alert) = self.volume_spike(quote, history.avg_volume(), now) {
            alerts.push(alert);
        }
        if let Some(alert) = self.rsi(symbol, closes, now) {
            alerts.push(alert);
        }
        if let Some(alert) = self.ema_cross(symbol, closes, now) {
            alerts.push(alert);
        }
        if let Some(alert) = self.sma_cross(symbol, closes, now) {
            alerts.push(alert);
        }

        debug!(
            symbol = %symbol,
            history_len = closes.len(),
            candidates = alerts.len(),
            "ThresholdEvaluator: {} candidate alerts for {}",
            alerts.len(),
            symbol
        );
        alerts
    }

    pub fn price_change(&self, quote: &Quote, now: DateTime<Utc>) -> Option<Alert> {
        let change_pct = quote.change_pct()?;
        let threshold = self.config.price_change_pct;
        if change_pct.abs() < threshold {
            return None;
        }

        let severity = if change_pct.abs() >= threshold * 2.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        let direction = if change_pct >= 0.0 { "up" } else { "down" };
        let message = format!(
            "{} {} {}% from previous close ({} -> {})",
            quote.symbol,
            direction,
            fixed2(change_pct.abs()),
            fixed2(quote.previous_close),
            fixed2(quote.price)
        );

        Some(
            Alert::new(&quote.symbol, AlertKind::PriceChange, severity, message, now)
                .with_field("changePct", fixed2(change_pct))
                .with_field("direction", direction)
                .with_field("price", quote.price)
                .with_field("previousClose", quote.previous_close)
                .with_field("threshold", threshold),
        )
    }

    pub fn volume_spike(&self, quote: &Quote, avg_volume: Option<f64>, now: DateTime<Utc>) -> Option<Alert> {
        let avg_volume = avg_volume.filter(|avg| *avg > 0.0)?;
        if quote.volume <= avg_volume * self.config.volume_spike_multiplier {
            return None;
        }

        let multiple = quote.volume / avg_volume;
        let severity = if multiple >= VOLUME_SPIKE_HIGH_MULTIPLE {
            Severity::High
        } else {
            Severity::Medium
        };
        let message = format!(
            "{} volume {}x the trailing average ({} vs {})",
            quote.symbol,
            fixed2(multiple),
            quote.volume.round(),
            avg_volume.round()
        );

        Some(
            Alert::new(&quote.symbol, AlertKind::VolumeSpike, severity, message, now)
                .with_field("volume", quote.volume)
                .with_field("avgVolume", avg_volume.round())
                .with_field("multiple", fixed2(multiple))
                .with_field("threshold", self.config.volume_spike_multiplier),
        )
    }

    pub fn rsi(&self, symbol: &str, closes: &[f64], now: DateTime<Utc>) -> Option<Alert> {
        let rsi = calculate_rsi(closes, DEFAULT_RSI_PERIOD)?;
        let (condition, level) = match self.analyze_rsi(rsi.value) {
            RsiAnalysis::Overbought => ("overbought", self.config.rsi_overbought),
            RsiAnalysis::Oversold => ("oversold", self.config.rsi_oversold),
            RsiAnalysis::Neutral => return None,
        };
        let message = format!(
            "{} RSI({}) {} at {} (level {})",
            symbol,
            rsi.period,
            condition,
            fixed2(rsi.value),
            level
        );

        Some(
            Alert::new(symbol, AlertKind::Rsi, Severity::Medium, message, now)
                .with_field("rsi", fixed2(rsi.value))
                .with_field("condition", condition)
                .with_field("level", level)
                .with_field("period", rsi.period),
        )
    }

    pub fn ema_cross(&self, symbol: &str, closes: &[f64], now: DateTime<Utc>) -> Option<Alert> {
        let (short, long) = (self.config.ema_short, self.config.ema_long);
        let (crossover, current) = crossover_on_series(closes, |series| ema_pair(series, short, long))?;
        let direction = match crossover {
            CrossoverType::Bullish => "bullish",
            CrossoverType::Bearish => "bearish",
            CrossoverType::None => return None,
        };
        let message = format!(
            "{} {} EMA cross: EMA{} {} / EMA{} {}",
            symbol,
            direction,
            short,
            fixed2(current.short),
            long,
            fixed2(current.long)
        );

        Some(moving_average_alert(symbol, message, now, "ema", direction, short, long, current))
    }

    pub fn sma_cross(&self, symbol: &str, closes: &[f64], now: DateTime<Utc>) -> Option<Alert> {
        let (short, long) = (self.config.sma_short, self.config.sma_long);
        let (crossover, current) = crossover_on_series(closes, |series| sma_pair(series, short, long))?;
        let (direction, cross) = match crossover {
            CrossoverType::Bullish => ("bullish", "golden"),
            CrossoverType::Bearish => ("bearish", "death"),
            CrossoverType::None => return None,
        };
        let message = format!(
            "{} {} cross: SMA{} {} / SMA{} {}",
            symbol,
            cross,
            short,
            fixed2(current.short),
            long,
            fixed2(current.long)
        );

        Some(
            moving_average_alert(symbol, message, now, "sma", direction, short, long, current)
                .with_field("cross", cross),
        )
    }

    fn analyze_rsi(&self, rsi: f64) -> RsiAnalysis {
        if rsi >= self.config.rsi_overbought {
            RsiAnalysis::Overbought
        } else if rsi <= self.config.rsi_oversold {
            RsiAnalysis::Oversold
        } else {
            RsiAnalysis::Neutral
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn moving_average_alert(
    symbol: &str,
    message: String,
    now: DateTime<Utc>,
    average: &str,
    direction: &str,
    short_period: u32,
    long_period: u32,
    current: AveragePair,
) -> Alert {
    Alert::new(symbol, AlertKind::MaCross, Severity::High, message, now)
        .with_field("average", average)
        .with_field("direction", direction)
        .with_field("shortPeriod", short_period)
        .with_field("longPeriod", long_period)
        .with_field("shortValue", fixed2(current.short))
        .with_field("longValue", fixed2(current.long))
}

enum RsiAnalysis {
    Overbought,
    Oversold,
    Neutral,
}
