//! Alert generation: threshold rules, position proximity, dedup and selection.

pub mod dedup;
pub mod engine;
pub mod positions;
pub mod thresholds;

pub use dedup::{AlertSelector, DedupLedger, SelectionOutcome};
pub use engine::{EngineState, SignalEngine};
pub use positions::PositionEvaluator;
pub use thresholds::ThresholdEvaluator;
