use crate::domain::{Decimal, Instrument, Side, Trade};
use chrono::Duration;
use std::collections::VecDeque;

use super::{HoldingRecord, Lot, LotSide, TermBucket};

/// FIFO lot matcher for a single instrument.
///
/// Holds two queues of open lots. A trade first consumes the oldest lots on the
/// opposite side; whatever it cannot absorb opens a new lot on its own side, so a
/// single trade may both close a long position and open a short one.
pub struct FifoLotMatcher {
    instrument: Instrument,
    term_bucket_cutoff: Duration,
    zero_tolerance: Decimal,

    long_lots: VecDeque<Lot>,
    short_lots: VecDeque<Lot>,

    // Outputs accumulated during processing.
    holdings: Vec<HoldingRecord>,
}

impl FifoLotMatcher {
    pub fn new(instrument: Instrument, term_bucket_cutoff: Duration, zero_tolerance: Decimal) -> Self {
        Self {
            instrument,
            term_bucket_cutoff,
            zero_tolerance,
            long_lots: VecDeque::new(),
            short_lots: VecDeque::new(),
            holdings: Vec::new(),
        }
    }

    /// Match a single trade against the open lots, emitting one holding record per
    /// lot fragment it closes.
    ///
    /// Callers must feed trades in non-decreasing time order; the analyzer
    /// validates this before any trade reaches the matcher. Zero-quantity trades
    /// leave the queues untouched.
    ///
    /// Returns the number of holding records emitted for this trade.
    pub fn process_trade(&mut self, trade: &Trade) -> usize {
        let Self {
            instrument,
            term_bucket_cutoff,
            zero_tolerance,
            long_lots,
            short_lots,
            holdings,
        } = self;

        let (opposite, own) = match trade.side {
            Side::Buy => (short_lots, long_lots),
            Side::Sell => (long_lots, short_lots),
        };

        let emitted_before = holdings.len();
        let mut remaining = trade.quantity;

        while remaining.is_positive() {
            let Some(head) = opposite.front_mut() else {
                break;
            };

            let matched = remaining.min(head.remaining_quantity);
            let duration = trade.time_ms.duration_since(head.open_time);

            holdings.push(HoldingRecord {
                instrument: instrument.clone(),
                lot_side: head.side,
                quantity: matched,
                open_time: head.open_time,
                close_time: trade.time_ms,
                term_bucket: TermBucket::classify(duration, *term_bucket_cutoff),
                opened_by: head.opened_by.clone(),
                closed_by: trade.trade_key().to_string(),
            });

            remaining -= matched;
            head.remaining_quantity -= matched;

            if head.remaining_quantity <= *zero_tolerance {
                opposite.pop_front();
            }
        }

        if remaining.is_positive() {
            own.push_back(Lot {
                side: LotSide::opened_by(trade.side),
                open_time: trade.time_ms,
                remaining_quantity: remaining,
                opened_by: trade.trade_key().to_string(),
            });
        }

        holdings.len() - emitted_before
    }

    /// Open buys awaiting a sell, oldest first.
    pub fn long_lots(&self) -> &VecDeque<Lot> {
        &self.long_lots
    }

    /// Open sells awaiting a buy, oldest first.
    pub fn short_lots(&self) -> &VecDeque<Lot> {
        &self.short_lots
    }

    pub fn holdings(&self) -> &[HoldingRecord] {
        &self.holdings
    }

    /// Get the accumulated outputs: holding records in emission order and the lots
    /// still open (long queue first, then short queue).
    pub fn into_outputs(self) -> (Vec<HoldingRecord>, Vec<Lot>) {
        let open_lots = self.long_lots.into_iter().chain(self.short_lots).collect();
        (self.holdings, open_lots)
    }
}
