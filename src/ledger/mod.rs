//! Ledger loading: the normalizer that turns a raw trade export into ordered,
//! per-instrument trade sequences.

use crate::domain::{group_by_instrument, Instrument, Trade};
use crate::engine::EngineError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub mod clean;
pub mod file;
pub mod mock;
pub mod normalize;

pub use file::CsvLedgerSource;
pub use mock::MockLedgerSource;
pub use normalize::{normalize_csv, NormalizeOptions};

/// A cleaned batch of trades, grouped by instrument and sorted by time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    trades: BTreeMap<Instrument, Vec<Trade>>,
    rejections: BTreeMap<Instrument, EngineError>,
    /// Raw rows dropped because they named no instrument.
    pub skipped_rows: Vec<u64>,
}

impl Ledger {
    /// Group and sort already-parsed trades.
    pub fn from_trades(trades: Vec<Trade>) -> Self {
        Self {
            trades: group_by_instrument(trades),
            rejections: BTreeMap::new(),
            skipped_rows: Vec::new(),
        }
    }

    /// Mark an instrument as unusable. The first rejection per instrument wins.
    pub fn reject(&mut self, error: EngineError) {
        self.rejections
            .entry(error.instrument().clone())
            .or_insert(error);
    }

    pub fn trades(&self) -> &BTreeMap<Instrument, Vec<Trade>> {
        &self.trades
    }

    pub fn rejections(&self) -> &BTreeMap<Instrument, EngineError> {
        &self.rejections
    }

    pub fn instrument_count(&self) -> usize {
        self.trades
            .keys()
            .chain(self.rejections.keys())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.values().map(Vec::len).sum()
    }

    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<Instrument, Vec<Trade>>,
        BTreeMap<Instrument, EngineError>,
    ) {
        (self.trades, self.rejections)
    }
}

/// Source of a complete trade ledger.
#[async_trait]
pub trait LedgerSource: Send + Sync + fmt::Debug {
    /// Load and normalize the whole batch.
    async fn load(&self) -> Result<Ledger, LedgerError>;
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv parse error: {0}")]
    Csv(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Side, TimeMs};
    use crate::engine::MalformedReason;

    fn trade(instrument: &str, time_ms: i64, row: u64) -> Trade {
        Trade::new(
            Instrument::new(instrument),
            TimeMs::new(time_ms),
            Side::Buy,
            Decimal::from(1),
            Decimal::zero(),
            row,
        )
    }

    fn rejection(instrument: &str, row: u64) -> EngineError {
        EngineError::MalformedInput {
            instrument: Instrument::new(instrument),
            record: format!("row {}", row),
            reason: MalformedReason::UnrecognizedSide("x".into()),
        }
    }

    #[test]
    fn test_counts_include_rejected_only_instruments() {
        let mut ledger = Ledger::from_trades(vec![trade("A", 0, 1), trade("A", 1, 2)]);
        ledger.reject(rejection("B", 3));
        assert_eq!(ledger.instrument_count(), 2);
        assert_eq!(ledger.trade_count(), 2);
    }

    #[test]
    fn test_first_rejection_wins() {
        let mut ledger = Ledger::default();
        ledger.reject(rejection("A", 4));
        ledger.reject(rejection("A", 9));
        match &ledger.rejections()[&Instrument::new("A")] {
            EngineError::MalformedInput { record, .. } => assert_eq!(record, "row 4"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::Csv("row 3: bad quoting".to_string());
        assert_eq!(err.to_string(), "csv parse error: row 3: bad quoting");
    }
}
