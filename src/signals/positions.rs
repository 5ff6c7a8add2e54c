//! Stop-loss and target proximity for tracked positions.

use crate::config::ThresholdConfig;
use crate::models::{fixed2, Alert, AlertKind, Position, Quote, Severity};
use chrono::{DateTime, Utc};

pub struct PositionEvaluator {
    near_stop_loss_pct: f64,
    near_target_pct: f64,
}

impl PositionEvaluator {
    pub fn new(near_stop_loss_pct: f64, near_target_pct: f64) -> Self {
        Self {
            near_stop_loss_pct,
            near_target_pct,
        }
    }

    pub fn from_thresholds(config: &ThresholdConfig) -> Self {
        Self::new(config.near_stop_loss_pct, config.near_target_pct)
    }

    /// One candidate per matching active position and level. No dedup here.
    pub fn evaluate(&self, quote: &Quote, positions: &[Position], now: DateTime<Utc>) -> Vec<Alert> {
        if !(quote.price > 0.0 && quote.price.is_finite()) {
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for position in positions
            .iter()
            .filter(|p| p.active && p.matches(&quote.symbol))
        {
            if let Some(stop_loss) = position.stop_loss {
                if let Some(alert) = self.stop_loss(quote, stop_loss, now) {
                    alerts.push(alert);
                }
            }
            if let Some(target) = position.target {
                if let Some(alert) = self.target(quote, target, now) {
                    alerts.push(alert);
                }
            }
        }
        alerts
    }

    fn stop_loss(&self, quote: &Quote, stop_loss: f64, now: DateTime<Utc>) -> Option<Alert> {
        let distance_pct = (quote.price - stop_loss) / quote.price * 100.0;
        if distance_pct.abs() > self.near_stop_loss_pct {
            return None;
        }
        let message = format!(
            "{} at {} is {}% from stop loss {}",
            quote.symbol,
            fixed2(quote.price),
            fixed2(distance_pct),
            fixed2(stop_loss)
        );
        Some(
            Alert::new(&quote.symbol, AlertKind::NearStopLoss, Severity::Critical, message, now)
                .with_field("price", quote.price)
                .with_field("stopLoss", stop_loss)
                .with_field("distancePct", fixed2(distance_pct)),
        )
    }

    fn target(&self, quote: &Quote, target: f64, now: DateTime<Utc>) -> Option<Alert> {
        let distance_pct = (target - quote.price) / quote.price * 100.0;
        if distance_pct.abs() > self.near_target_pct {
            return None;
        }
        let message = format!(
            "{} at {} is {}% from target {}",
            quote.symbol,
            fixed2(quote.price),
            fixed2(distance_pct),
            fixed2(target)
        );
        Some(
            Alert::new(&quote.symbol, AlertKind::NearTarget, Severity::High, message, now)
                .with_field("price", quote.price)
                .with_field("target", target)
                .with_field("distancePct", fixed2(distance_pct)),
        )
    }
}
