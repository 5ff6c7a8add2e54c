//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{AveragePair, EmaIndicator};

/// Calculate EMA for a specific period
///
/// Seeded with the simple average of the first `period` closes, then
/// smoothed forward with `k = 2 / (period + 1)` over the rest.
pub fn calculate_ema(closes: &[f64], period: u32) -> Option<EmaIndicator> {
    if closes.len() < period as usize {
        return None;
    }

    let ema_value = math::ema(closes, period as usize)?;

    Some(EmaIndicator {
        value: ema_value,
        period,
    })
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(closes: &[f64], periods: &[u32]) -> Vec<EmaIndicator> {
    periods
        .iter()
        .filter_map(|&period| calculate_ema(closes, period))
        .collect()
}

/// Short and long EMA at the end of `closes`, if both are computable
pub fn ema_pair(closes: &[f64], short_period: u32, long_period: u32) -> Option<AveragePair> {
    let short = calculate_ema(closes, short_period)?;
    let long = calculate_ema(closes, long_period)?;
    Some(AveragePair::new(short.value, long.value))
}
