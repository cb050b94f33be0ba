//! Lag-1 quick-turn detection.

use super::ToxicityFlag;
use crate::domain::{Side, TimeMs, Trade};
use chrono::Duration;

/// Outcome of comparing a trade with the one immediately before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToxicityCheck {
    pub flag: ToxicityFlag,
    /// Elapsed time since the previous trade; `None` for the first trade.
    pub since_previous: Option<Duration>,
    pub previous_side: Option<Side>,
}

/// Flags a trade that flips side within `threshold` of the previous trade
/// on the same instrument.
#[derive(Debug)]
pub struct ToxicityClassifier {
    threshold: Duration,
    last_seen: Option<(TimeMs, Side)>,
}

impl ToxicityClassifier {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_seen: None,
        }
    }

    /// Classify `trade` against the previous one and remember it for the next call.
    ///
    /// The window is inclusive: a reversal exactly `threshold` later is toxic.
    pub fn process_trade(&mut self, trade: &Trade) -> ToxicityCheck {
        let check = match self.last_seen {
            None => ToxicityCheck {
                flag: ToxicityFlag::Normal,
                since_previous: None,
                previous_side: None,
            },
            Some((prev_time, prev_side)) => {
                let elapsed = trade.time_ms.duration_since(prev_time);
                let flag = if elapsed <= self.threshold && trade.side != prev_side {
                    ToxicityFlag::Toxic
                } else {
                    ToxicityFlag::Normal
                };
                ToxicityCheck {
                    flag,
                    since_previous: Some(elapsed),
                    previous_side: Some(prev_side),
                }
            }
        };

        self.last_seen = Some((trade.time_ms, trade.side));
        check
    }
}
