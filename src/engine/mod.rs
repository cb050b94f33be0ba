//! Pure computation engine(s) for deterministic ledger logic.

use crate::domain::{Decimal, Instrument, Side, TimeMs, Trade};
use chrono::Duration;
use serde::Serialize;
use std::fmt;

pub mod accumulator;
pub mod error;
pub mod lot_matcher;
pub mod toxicity;

pub use accumulator::{PositionAccumulator, RunningTotals};
pub use error::{EngineError, MalformedReason};
pub use lot_matcher::FifoLotMatcher;
pub use toxicity::{ToxicityCheck, ToxicityClassifier};

/// Which queue an open lot lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LotSide {
    /// Opened by a buy, awaiting a sell.
    Long,
    /// Opened by a sell, awaiting a buy.
    Short,
}

impl LotSide {
    /// The queue a trade's unmatched remainder opens into.
    pub fn opened_by(side: Side) -> Self {
        match side {
            Side::Buy => LotSide::Long,
            Side::Sell => LotSide::Short,
        }
    }
}

impl fmt::Display for LotSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotSide::Long => write!(f, "Long"),
            LotSide::Short => write!(f, "Short"),
        }
    }
}

/// An open, not yet fully matched fragment of an opening trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    pub side: LotSide,
    pub open_time: TimeMs,
    pub remaining_quantity: Decimal,
    /// Trade key of the trade that opened the lot.
    pub opened_by: String,
}

/// Coarse holding-duration classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TermBucket {
    Intraday,
    Swing,
}

impl TermBucket {
    /// `duration < cutoff` is Intraday; a duration equal to the cutoff is already Swing.
    pub fn classify(duration: Duration, cutoff: Duration) -> Self {
        if duration < cutoff {
            TermBucket::Intraday
        } else {
            TermBucket::Swing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TermBucket::Intraday => "Intraday",
            TermBucket::Swing => "Swing",
        }
    }
}

impl fmt::Display for TermBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One matched lot fragment: an opening lot (or part of it) closed by a later trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingRecord {
    pub instrument: Instrument,
    /// Side of the lot that was closed.
    pub lot_side: LotSide,
    pub quantity: Decimal,
    pub open_time: TimeMs,
    pub close_time: TimeMs,
    pub term_bucket: TermBucket,
    pub opened_by: String,
    pub closed_by: String,
}

impl HoldingRecord {
    pub fn duration(&self) -> Duration {
        self.close_time.duration_since(self.open_time)
    }

    /// Holding time in minutes, rounded to 4 decimal places.
    pub fn duration_minutes(&self) -> Decimal {
        let ms = Decimal::from(self.duration().num_milliseconds());
        (ms / Decimal::from(60_000)).round_dp(4)
    }
}

/// Quick-turn classification of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToxicityFlag {
    Toxic,
    Normal,
}

impl ToxicityFlag {
    pub fn is_toxic(&self) -> bool {
        matches!(self, ToxicityFlag::Toxic)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToxicityFlag::Toxic => "Toxic (Quick Turn)",
            ToxicityFlag::Normal => "Normal Trade",
        }
    }
}

impl fmt::Display for ToxicityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A trade together with the running columns computed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedTrade {
    pub trade: Trade,
    pub signed_quantity: Decimal,
    pub cumulative_position: Decimal,
    pub cumulative_realized_pl: Decimal,
    pub toxicity: ToxicityCheck,
}

impl AnnotatedTrade {
    pub fn toxicity_flag(&self) -> ToxicityFlag {
        self.toxicity.flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(open_ms: i64, close_ms: i64) -> HoldingRecord {
        HoldingRecord {
            instrument: Instrument::new("EURUSD"),
            lot_side: LotSide::Long,
            quantity: Decimal::from(1),
            open_time: TimeMs::new(open_ms),
            close_time: TimeMs::new(close_ms),
            term_bucket: TermBucket::Intraday,
            opened_by: "a".into(),
            closed_by: "b".into(),
        }
    }

    #[test]
    fn test_term_bucket_boundary() {
        let cutoff = Duration::days(1);
        assert_eq!(TermBucket::classify(Duration::days(1), cutoff), TermBucket::Swing);
        assert_eq!(
            TermBucket::classify(Duration::days(1) - Duration::seconds(1), cutoff),
            TermBucket::Intraday
        );
        assert_eq!(
            TermBucket::classify(Duration::hours(23) + Duration::minutes(59), cutoff),
            TermBucket::Intraday
        );
        assert_eq!(TermBucket::classify(Duration::zero(), cutoff), TermBucket::Intraday);
    }

    #[test]
    fn test_holding_duration_minutes() {
        assert_eq!(record(0, 90_000).duration_minutes(), Decimal::from_parts(15, 1));
        assert_eq!(record(0, 1).duration_minutes(), Decimal::zero());
        assert_eq!(record(0, 90_000).duration(), Duration::seconds(90));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ToxicityFlag::Toxic.to_string(), "Toxic (Quick Turn)");
        assert_eq!(ToxicityFlag::Normal.to_string(), "Normal Trade");
        assert_eq!(TermBucket::Swing.to_string(), "Swing");
        assert_eq!(LotSide::opened_by(Side::Sell), LotSide::Short);
    }
}
