use crate::config::ConfigError;
use crate::export::ExportError;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Failures that abort a whole run. Per-instrument problems never end up here;
/// they are carried in `BatchReport::failures`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
