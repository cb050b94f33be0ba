//! Trade type representing a single executed trade from the ledger.

use crate::domain::{Decimal, Instrument, Side, TimeMs};
use serde::{Deserialize, Serialize};

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Stable unique identifier for this trade.
    pub trade_key: String,
    /// Instrument the trade was executed on.
    pub instrument: Instrument,
    /// Execution time in milliseconds since Unix epoch.
    pub time_ms: TimeMs,
    /// Trade side (Buy or Sell).
    pub side: Side,
    /// Trade size, never negative once normalized.
    pub quantity: Decimal,
    /// Settled P&L attributed to this trade event.
    pub realized_pl: Decimal,
    /// 1-based data row in the raw ledger.
    pub source_row: u64,
}

impl Trade {
    /// Create a new Trade.
    pub fn new(
        instrument: Instrument,
        time_ms: TimeMs,
        side: Side,
        quantity: Decimal,
        realized_pl: Decimal,
        source_row: u64,
    ) -> Self {
        let trade_key = Self::compute_trade_key(
            &instrument,
            time_ms,
            side,
            &quantity,
            &realized_pl,
            source_row,
        );
        Trade {
            trade_key,
            instrument,
            time_ms,
            side,
            quantity,
            realized_pl,
            source_row,
        }
    }

    /// Generate a stable key from the deterministic fields.
    ///
    /// The source row is part of the hash so that two identical executions in the
    /// same minute still get distinct keys.
    pub fn compute_trade_key(
        instrument: &Instrument,
        time_ms: TimeMs,
        side: Side,
        quantity: &Decimal,
        realized_pl: &Decimal,
        source_row: u64,
    ) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(instrument.as_str());
        hasher.update(time_ms.as_ms().to_le_bytes());
        hasher.update(if side == Side::Buy { b"B" } else { b"S" });
        hasher.update(quantity.to_canonical_string());
        hasher.update(realized_pl.to_canonical_string());
        hasher.update(source_row.to_le_bytes());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// Borrow the precomputed trade key.
    pub fn trade_key(&self) -> &str {
        &self.trade_key
    }

    /// `+quantity` for buys, `-quantity` for sells.
    pub fn signed_quantity(&self) -> Decimal {
        match self.side {
            Side::Buy => self.quantity,
            Side::Sell => -self.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(side: Side, qty: &str, row: u64) -> Trade {
        Trade::new(
            Instrument::new("EURUSD"),
            TimeMs::new(1_000),
            side,
            Decimal::from_str_canonical(qty).unwrap(),
            Decimal::zero(),
            row,
        )
    }

    #[test]
    fn test_trade_key_shape() {
        let trade = make_trade(Side::Buy, "1.5", 1);
        assert!(trade.trade_key().starts_with("hash:"));
        assert_eq!(trade.trade_key().len(), 5 + 32);
    }

    #[test]
    fn test_trade_key_deterministic() {
        let a = make_trade(Side::Buy, "1.5", 1);
        let b = make_trade(Side::Buy, "1.5", 1);
        assert_eq!(a.trade_key, b.trade_key, "Same inputs must produce same key");
    }

    #[test]
    fn test_trade_key_distinguishes_rows() {
        let a = make_trade(Side::Buy, "1.5", 1);
        let b = make_trade(Side::Buy, "1.5", 2);
        assert_ne!(a.trade_key, b.trade_key);
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(
            make_trade(Side::Buy, "2", 1).signed_quantity(),
            Decimal::from_str_canonical("2").unwrap()
        );
        assert_eq!(
            make_trade(Side::Sell, "2", 1).signed_quantity(),
            Decimal::from_str_canonical("-2").unwrap()
        );
    }

    #[test]
    fn test_trade_serialization() {
        let trade = make_trade(Side::Sell, "3.25", 7);
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
