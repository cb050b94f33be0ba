pub mod analysis;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod ledger;
pub mod orchestration;

pub use analysis::{BatchAnalyzer, BatchReport, InstrumentReport};
pub use config::{AnalysisConfig, Config};
pub use domain::{Decimal, Instrument, Side, TimeMs, Trade};
pub use engine::{AnnotatedTrade, EngineError, HoldingRecord, Lot, LotSide, TermBucket, ToxicityFlag};
pub use error::AppError;
pub use ledger::{CsvLedgerSource, Ledger, LedgerSource, MockLedgerSource};
