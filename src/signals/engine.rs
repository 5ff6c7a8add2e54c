//! Per-instrument evaluation: both evaluators, then selection.

use crate::config::{SelectionConfig, ThresholdConfig};
use crate::history::{HistoryStore, PriceHistory};
use crate::models::{Position, Quote};
use crate::signals::dedup::{AlertSelector, DedupLedger, SelectionOutcome};
use crate::signals::positions::PositionEvaluator;
use crate::signals::thresholds::ThresholdEvaluator;
use chrono::{DateTime, Utc};

/// State that outlives a cycle. Owned by whoever drives the cycles, so
/// tests can build isolated instances.
#[derive(Debug, Default)]
pub struct EngineState {
    pub history: HistoryStore,
    pub ledger: DedupLedger,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct SignalEngine {
    thresholds: ThresholdEvaluator,
    positions: PositionEvaluator,
    selector: AlertSelector,
}

impl SignalEngine {
    pub fn new(thresholds: ThresholdConfig, selection: SelectionConfig) -> Self {
        Self {
            positions: PositionEvaluator::from_thresholds(&thresholds),
            thresholds: ThresholdEvaluator::new(thresholds),
            selector: AlertSelector::new(selection),
        }
    }

    pub fn thresholds(&self) -> &ThresholdEvaluator {
        &self.thresholds
    }

    pub fn selector(&self) -> &AlertSelector {
        &self.selector
    }

    /// Threshold candidates first, then position candidates, then selection.
    pub fn evaluate(
        &self,
        quote: &Quote,
        history: &PriceHistory,
        positions: &[Position],
        ledger: &mut DedupLedger,
        now: DateTime<Utc>,
    ) -> SelectionOutcome {
        let mut candidates = self.thresholds.evaluate(quote, history, now);
        candidates.extend(self.positions.evaluate(quote, positions, now));
        self.selector.select(ledger, &quote.symbol, candidates, now)
    }
}
