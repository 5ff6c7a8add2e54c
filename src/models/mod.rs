//! Shared data models spanning the engine layers.

pub mod alert;
pub mod indicators;
pub mod position;
pub mod quote;

pub use alert::{
    fixed2, Alert, AlertBatch, AlertKind, AlertStatus, ChartTimeframe, ParseAlertKindError,
    Payload, PayloadValue, Severity,
};
pub use indicators::{AveragePair, EmaIndicator, RsiIndicator, SmaIndicator};
pub use position::Position;
pub use quote::{HistoricalBar, Quote};
