//! Stable trade ordering and per-instrument grouping.

use crate::domain::{Instrument, Trade};
use std::collections::BTreeMap;

/// Stable ordering key for trades.
///
/// Ordering: time_ms -> source_row -> trade_key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TradeOrderingKey {
    /// Time in milliseconds (primary sort).
    pub time_ms: i64,
    /// Ledger row (secondary sort; preserves file order for equal timestamps).
    pub source_row: u64,
    /// Trade key hash (fallback sort).
    pub trade_key: String,
}

impl TradeOrderingKey {
    pub fn from_trade(trade: &Trade) -> Self {
        TradeOrderingKey {
            time_ms: trade.time_ms.as_ms(),
            source_row: trade.source_row,
            trade_key: trade.trade_key().to_string(),
        }
    }
}

/// Sort trades deterministically.
pub fn sort_trades_deterministic(trades: &mut [Trade]) {
    trades.sort_by(|a, b| {
        let key_a = TradeOrderingKey::from_trade(a);
        let key_b = TradeOrderingKey::from_trade(b);
        key_a.cmp(&key_b)
    });
}

/// Split trades by instrument; each group comes back sorted.
pub fn group_by_instrument(trades: Vec<Trade>) -> BTreeMap<Instrument, Vec<Trade>> {
    let mut grouped: BTreeMap<Instrument, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        grouped
            .entry(trade.instrument.clone())
            .or_default()
            .push(trade);
    }
    for group in grouped.values_mut() {
        sort_trades_deterministic(group);
    }
    grouped
}
