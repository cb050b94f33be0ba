use super::{normalize_csv, Ledger, LedgerError, LedgerSource, NormalizeOptions};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads a broker CSV export from disk.
#[derive(Debug, Clone)]
pub struct CsvLedgerSource {
    path: PathBuf,
    options: NormalizeOptions,
}

impl CsvLedgerSource {
    pub fn new(path: impl Into<PathBuf>, options: NormalizeOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

#[async_trait]
impl LedgerSource for CsvLedgerSource {
    async fn load(&self) -> Result<Ledger, LedgerError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LedgerError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let ledger = normalize_csv(&bytes, &self.options)?;

        tracing::info!(
            path = %self.path.display(),
            instruments = ledger.instrument_count(),
            trades = ledger.trade_count(),
            rejected = ledger.rejections().len(),
            "Loaded ledger"
        );

        Ok(ledger)
    }
}
