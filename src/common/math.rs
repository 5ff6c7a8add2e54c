//! Shared numeric helpers for the indicator library.

/// Arithmetic mean of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Smoothing factor `2 / (period + 1)`.
pub fn ema_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// One EMA step from the previous EMA value.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = ema_multiplier(period);
    (value - previous) * k + previous
}

/// EMA over the whole series, seeded with the simple average of the first
/// `period` values.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, &value| ema_from_previous(value, prev, period)),
    )
}

/// Signed percent change from `base` to `value`. `None` when `base` is not positive.
pub fn percent_change(value: f64, base: f64) -> Option<f64> {
    if base <= 0.0 || !base.is_finite() {
        return None;
    }
    Some((value - base) / base * 100.0)
}
