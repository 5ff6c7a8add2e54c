//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{AveragePair, SmaIndicator};

/// Calculate SMA over the trailing `period` closes
pub fn calculate_sma(closes: &[f64], period: u32) -> Option<SmaIndicator> {
    let value = math::sma(closes, period as usize)?;
    Some(SmaIndicator { value, period })
}

/// Short and long SMA at the end of `closes`, if both are computable
pub fn sma_pair(closes: &[f64], short_period: u32, long_period: u32) -> Option<AveragePair> {
    let short = calculate_sma(closes, short_period)?;
    let long = calculate_sma(closes, long_period)?;
    Some(AveragePair::new(short.value, long.value))
}
