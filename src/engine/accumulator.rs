use super::MalformedReason;
use crate::domain::{Decimal, Trade};

/// Running totals of one instrument as of and including the latest trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunningTotals {
    /// Net signed position: positive = long, negative = short, zero = flat.
    pub cumulative_position: Decimal,
    pub cumulative_realized_pl: Decimal,
}

/// Per-instrument running fold of signed position and realized P&L.
#[derive(Debug, Default)]
pub struct PositionAccumulator {
    pub state: RunningTotals,
}

impl PositionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one trade in and return the totals including it.
    ///
    /// On overflow the state is left as it was before the trade.
    ///
    /// # Errors
    /// `MalformedReason::Overflow` naming the total that left the decimal range.
    pub fn process_trade(&mut self, trade: &Trade) -> Result<RunningTotals, MalformedReason> {
        let cumulative_position = checked_total(
            "cumulative_position",
            self.state.cumulative_position,
            trade.signed_quantity(),
        )?;
        let cumulative_realized_pl = checked_total(
            "cumulative_realized_pl",
            self.state.cumulative_realized_pl,
            trade.realized_pl,
        )?;
        self.state = RunningTotals {
            cumulative_position,
            cumulative_realized_pl,
        };
        Ok(self.state)
    }
}

fn checked_total(
    total: &str,
    current: Decimal,
    addend: Decimal,
) -> Result<Decimal, MalformedReason> {
    current.checked_add(addend).ok_or_else(|| MalformedReason::Overflow {
        total: total.to_string(),
        addend,
    })
}
