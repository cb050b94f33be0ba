use crate::analysis::{BatchAnalyzer, BatchReport};
use crate::error::AppError;
use crate::export::{export_to_dir, ExportedFiles};
use crate::ledger::LedgerSource;
use std::path::PathBuf;
use std::sync::Arc;

/// Wires ledger loading, analysis and export into one run.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    source: Arc<dyn LedgerSource>,
    analyzer: BatchAnalyzer,
    output_dir: PathBuf,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub batch: BatchReport,
    pub files: ExportedFiles,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn LedgerSource>,
        analyzer: BatchAnalyzer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            analyzer,
            output_dir: output_dir.into(),
        }
    }

    /// Load the ledger, analyse every instrument and export the results.
    ///
    /// Only load and export problems fail the run; instrument-level failures are
    /// reported inside the returned batch.
    pub async fn run(&self) -> Result<RunOutcome, AppError> {
        let ledger = self.source.load().await?;
        let batch = self.analyzer.run_concurrent(ledger).await;
        let files = export_to_dir(&self.output_dir, &batch).await?;

        let summary = batch.summary();
        tracing::info!(
            instruments = summary.instruments_analyzed,
            failed = summary.instruments_failed,
            holdings = summary.holding_records,
            toxic = summary.toxic_trades,
            "Run complete"
        );

        Ok(RunOutcome { batch, files })
    }
}
