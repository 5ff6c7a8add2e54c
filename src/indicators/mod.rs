//! Pure indicator functions over closing-price sequences.
//!
//! Every function returns `None` when the series is too short; callers skip
//! the dependent rule rather than treating the value as zero.

pub mod momentum;
pub mod trend;

pub use momentum::*;
pub use trend::*;
