//! Trend indicators: EMA, SMA and crossover detection

pub mod crossover;
pub mod ema;
pub mod sma;

pub use crossover::*;
pub use ema::*;
pub use sma::*;
