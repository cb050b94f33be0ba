//! Single fused pass over one instrument's trades.

use crate::config::AnalysisConfig;
use crate::domain::{Decimal, Instrument, Trade};
use crate::engine::{
    AnnotatedTrade, EngineError, FifoLotMatcher, HoldingRecord, Lot, MalformedReason,
    PositionAccumulator, ToxicityClassifier,
};

/// Everything derived for one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentReport {
    pub instrument: Instrument,
    /// Input trades in processing order with their running columns.
    pub trades: Vec<AnnotatedTrade>,
    /// Matched lot fragments in emission order.
    pub holdings: Vec<HoldingRecord>,
    /// Lots left open at the end of the batch (long queue first).
    pub open_lots: Vec<Lot>,
}

impl InstrumentReport {
    /// Net position after the last trade.
    pub fn closing_position(&self) -> Decimal {
        self.trades
            .last()
            .map(|t| t.cumulative_position)
            .unwrap_or_default()
    }

    pub fn toxic_trade_count(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.toxicity_flag().is_toxic())
            .count()
    }
}

/// Analyse one instrument's ordered trades.
///
/// The whole sequence is validated before any state is built, so a malformed
/// record yields an error and no partial output.
///
/// # Errors
/// `EngineError::MalformedInput` naming the first offending trade, including a
/// trade that pushes a running total out of the decimal range.
pub fn analyze_instrument(
    instrument: &Instrument,
    trades: &[Trade],
    config: &AnalysisConfig,
) -> Result<InstrumentReport, EngineError> {
    validate_sequence(instrument, trades)?;

    let mut accumulator = PositionAccumulator::new();
    let mut classifier = ToxicityClassifier::new(config.toxicity_threshold());
    let mut matcher = FifoLotMatcher::new(
        instrument.clone(),
        config.term_bucket_cutoff(),
        config.zero_tolerance(),
    );

    let mut annotated = Vec::with_capacity(trades.len());
    for trade in trades {
        let totals = accumulator
            .process_trade(trade)
            .map_err(|reason| EngineError::MalformedInput {
                instrument: instrument.clone(),
                record: trade.trade_key().to_string(),
                reason,
            })?;
        let toxicity = classifier.process_trade(trade);
        matcher.process_trade(trade);

        annotated.push(AnnotatedTrade {
            trade: trade.clone(),
            signed_quantity: trade.signed_quantity(),
            cumulative_position: totals.cumulative_position,
            cumulative_realized_pl: totals.cumulative_realized_pl,
            toxicity,
        });
    }

    let (holdings, open_lots) = matcher.into_outputs();

    tracing::debug!(
        instrument = %instrument,
        trades = annotated.len(),
        holdings = holdings.len(),
        open_lots = open_lots.len(),
        "Analysed instrument"
    );

    Ok(InstrumentReport {
        instrument: instrument.clone(),
        trades: annotated,
        holdings,
        open_lots,
    })
}

fn validate_sequence(instrument: &Instrument, trades: &[Trade]) -> Result<(), EngineError> {
    let malformed = |trade: &Trade, reason: MalformedReason| EngineError::MalformedInput {
        instrument: instrument.clone(),
        record: trade.trade_key().to_string(),
        reason,
    };

    let mut previous = None;
    for trade in trades {
        if &trade.instrument != instrument {
            return Err(malformed(
                trade,
                MalformedReason::WrongInstrument(trade.instrument.clone()),
            ));
        }
        if trade.quantity.is_negative() {
            return Err(malformed(trade, MalformedReason::NegativeQuantity(trade.quantity)));
        }
        if let Some(prev) = previous {
            if trade.time_ms < prev {
                return Err(malformed(
                    trade,
                    MalformedReason::NonMonotonicTimestamp {
                        previous: prev,
                        current: trade.time_ms,
                    },
                ));
            }
        }
        previous = Some(trade.time_ms);
    }
    Ok(())
}
