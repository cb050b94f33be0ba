//! Domain types and determinism layer for the trade ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Instrument, Side
//! - Trade type with a stable content-derived key
//! - Stable trade ordering and per-instrument grouping

pub mod decimal;
pub mod ordering;
pub mod primitives;
pub mod trade;

pub use decimal::Decimal;
pub use ordering::{group_by_instrument, sort_trades_deterministic, TradeOrderingKey};
pub use primitives::{Instrument, Side, TimeMs};
pub use trade::Trade;
