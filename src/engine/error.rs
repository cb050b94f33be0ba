//! Per-instrument failure taxonomy.

use crate::domain::{Decimal, Instrument, TimeMs};
use thiserror::Error;

/// Why an instrument could not be analysed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A trade violates an input precondition; nothing is emitted for the instrument.
    #[error("malformed input for {instrument} at {record}: {reason}")]
    MalformedInput {
        instrument: Instrument,
        /// Trade key, or `row N` for rows rejected before a trade could be built.
        record: String,
        reason: MalformedReason,
    },
    /// The worker analysing the instrument did not complete.
    #[error("analysis of {instrument} aborted: {message}")]
    Aborted {
        instrument: Instrument,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("negative quantity {0}")]
    NegativeQuantity(Decimal),
    #[error("timestamp {current} precedes previous trade at {previous}")]
    NonMonotonicTimestamp { previous: TimeMs, current: TimeMs },
    #[error("trade belongs to instrument {0}")]
    WrongInstrument(Instrument),
    #[error("unrecognized side {0:?}")]
    UnrecognizedSide(String),
    #[error("unparseable {field}: {value:?}")]
    UnparseableField { field: String, value: String },
    /// A running total left the representable decimal range.
    #[error("{total} overflows after adding {addend}")]
    Overflow { total: String, addend: Decimal },
}

impl EngineError {
    pub fn instrument(&self) -> &Instrument {
        match self {
            EngineError::MalformedInput { instrument, .. } => instrument,
            EngineError::Aborted { instrument, .. } => instrument,
        }
    }
}
