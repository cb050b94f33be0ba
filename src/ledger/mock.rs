//! Mock ledger source for testing without touching the filesystem.

use super::{Ledger, LedgerError, LedgerSource};
use crate::domain::Trade;
use crate::engine::EngineError;
use async_trait::async_trait;

/// Mock ledger source that returns predefined trades.
#[derive(Debug, Clone, Default)]
pub struct MockLedgerSource {
    trades: Vec<Trade>,
    rejections: Vec<EngineError>,
}

impl MockLedgerSource {
    /// Create a new mock source with no trades.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trade.
    pub fn with_trade(mut self, trade: Trade) -> Self {
        self.trades.push(trade);
        self
    }

    /// Add multiple trades.
    pub fn with_trades(mut self, trades: Vec<Trade>) -> Self {
        self.trades.extend(trades);
        self
    }

    /// Add a normalizer rejection for an instrument.
    pub fn with_rejection(mut self, rejection: EngineError) -> Self {
        self.rejections.push(rejection);
        self
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn load(&self) -> Result<Ledger, LedgerError> {
        let mut ledger = Ledger::from_trades(self.trades.clone());
        for rejection in &self.rejections {
            ledger.reject(rejection.clone());
        }
        Ok(ledger)
    }
}
