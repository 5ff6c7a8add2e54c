//! Crossover detection between a short and a long moving average.

use crate::models::indicators::AveragePair;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    Bullish,
    Bearish,
    None,
}

/// Compare the pair one step back with the pair now.
///
/// Bullish: short was at or below long and is now above it.
/// Bearish: short was at or above long and is now below it.
pub fn detect_crossover(previous: AveragePair, current: AveragePair) -> CrossoverType {
    if previous.short <= previous.long && current.short > current.long {
        CrossoverType::Bullish
    } else if previous.short >= previous.long && current.short < current.long {
        CrossoverType::Bearish
    } else {
        CrossoverType::None
    }
}

/// Run `pair_fn` on the full series and on the series without its last
/// point, then detect a crossover between the two.
///
/// Returns `None` when either snapshot is not computable.
pub fn crossover_on_series<F>(closes: &[f64], pair_fn: F) -> Option<(CrossoverType, AveragePair)>
where
    F: Fn(&[f64]) -> Option<AveragePair>,
{
    let (_, previous_closes) = closes.split_last()?;
    let current = pair_fn(closes)?;
    let previous = pair_fn(previous_closes)?;
    Some((detect_crossover(previous, current), current))
}
