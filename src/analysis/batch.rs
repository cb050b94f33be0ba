use super::instrument::{analyze_instrument, InstrumentReport};
use crate::config::AnalysisConfig;
use crate::domain::Instrument;
use crate::engine::{AnnotatedTrade, EngineError, HoldingRecord, Lot};
use crate::ledger::Ledger;
use serde::Serialize;
use std::collections::BTreeMap;

/// Results of a whole batch: successful instruments plus per-instrument failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub reports: BTreeMap<Instrument, InstrumentReport>,
    pub failures: BTreeMap<Instrument, EngineError>,
}

impl BatchReport {
    /// Annotated trades, instrument by instrument.
    pub fn annotated_trades(&self) -> impl Iterator<Item = &AnnotatedTrade> {
        self.reports.values().flat_map(|r| r.trades.iter())
    }

    /// Holding records, instrument by instrument, each in emission order.
    pub fn holding_records(&self) -> impl Iterator<Item = &HoldingRecord> {
        self.reports.values().flat_map(|r| r.holdings.iter())
    }

    pub fn open_lots(&self) -> impl Iterator<Item = (&Instrument, &Lot)> {
        self.reports
            .iter()
            .flat_map(|(instrument, r)| r.open_lots.iter().map(move |lot| (instrument, lot)))
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            instruments_analyzed: self.reports.len(),
            instruments_failed: self.failures.len(),
            trades: self.annotated_trades().count(),
            toxic_trades: self.reports.values().map(|r| r.toxic_trade_count()).sum(),
            holding_records: self.holding_records().count(),
            open_lots: self.open_lots().count(),
            failures: self
                .failures
                .iter()
                .map(|(instrument, error)| FailureSummary {
                    instrument: instrument.to_string(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }

    fn record(&mut self, instrument: Instrument, outcome: Result<InstrumentReport, EngineError>) {
        match outcome {
            Ok(report) => {
                self.reports.insert(instrument, report);
            }
            Err(error) => {
                tracing::warn!(instrument = %instrument, error = %error, "Instrument analysis failed");
                self.failures.insert(instrument, error);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub instruments_analyzed: usize,
    pub instruments_failed: usize,
    pub trades: usize,
    pub toxic_trades: usize,
    pub holding_records: usize,
    pub open_lots: usize,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub instrument: String,
    pub error: String,
}

/// Runs the per-instrument analysis over a whole ledger.
///
/// Instruments are independent: a failure in one is recorded and the rest still
/// complete. Instruments rejected by the normalizer are reported as failed
/// without being analysed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAnalyzer {
    config: AnalysisConfig,
}

impl BatchAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyse every instrument on the current thread.
    pub fn run(&self, ledger: Ledger) -> BatchReport {
        let (trades, rejections) = ledger.into_parts();
        tracing::info!(instruments = trades.len(), rejected = rejections.len(), "Analysing batch");

        let mut batch = BatchReport::default();
        for (instrument, sequence) in trades {
            if rejections.contains_key(&instrument) {
                continue;
            }
            let outcome = analyze_instrument(&instrument, &sequence, &self.config);
            batch.record(instrument, outcome);
        }
        for (instrument, error) in rejections {
            batch.record(instrument, Err(error));
        }
        batch
    }

    /// Analyse instruments concurrently on the blocking pool.
    ///
    /// Produces the same report as [`BatchAnalyzer::run`]; a worker that panics
    /// is reported as an `Aborted` failure for its instrument only.
    pub async fn run_concurrent(&self, ledger: Ledger) -> BatchReport {
        let (trades, rejections) = ledger.into_parts();
        tracing::info!(
            instruments = trades.len(),
            rejected = rejections.len(),
            "Analysing batch concurrently"
        );

        let config = self.config;
        let (instruments, workers): (Vec<_>, Vec<_>) = trades
            .into_iter()
            .filter(|(instrument, _)| !rejections.contains_key(instrument))
            .map(|(instrument, sequence)| {
                let worker_instrument = instrument.clone();
                let worker = tokio::task::spawn_blocking(move || {
                    analyze_instrument(&worker_instrument, &sequence, &config)
                });
                (instrument, worker)
            })
            .unzip();

        let joined = futures::future::join_all(workers).await;

        let mut batch = BatchReport::default();
        for (instrument, result) in instruments.into_iter().zip(joined) {
            let outcome = result.unwrap_or_else(|e| {
                Err(EngineError::Aborted {
                    instrument: instrument.clone(),
                    message: e.to_string(),
                })
            });
            batch.record(instrument, outcome);
        }
        for (instrument, error) in rejections {
            batch.record(instrument, Err(error));
        }
        batch
    }
}
