//! End-to-end: raw broker CSV on disk through normalization, analysis and export.

use std::sync::Arc;
use tempfile::TempDir;
use tradelens::export::{HOLDINGS_FILE, OPEN_POSITIONS_FILE, TRADES_FILE};
use tradelens::ledger::NormalizeOptions;
use tradelens::orchestration::Orchestrator;
use tradelens::{BatchAnalyzer, CsvLedgerSource, Instrument};

const LEDGER: &str = "\
Instrument,Transfer Date,Buy/Sell,Trade Amount,Settled PL
EURUSD,08/01/24 09:00,Buy,\"10,000\",—
EURUSD,08/01/24 09:30,Buy,\"5,000\",—
GBPUSD,08/01/24 09:31,Sell,\"2,000\",—
EURUSD,08/01/24 09:30,Sell,\"12,000\",\"1,234.56\"
GBPUSD,08/02/24 09:31,Buy,\"2,000\",-45.10
XAUUSD,08/01/24 10:00,Buy,5,—
XAUUSD,08/01/24 10:01,Flat,5,—
";

async fn run_pipeline() -> (tradelens::orchestration::RunOutcome, TempDir) {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("ledger.csv");
    std::fs::write(&input, LEDGER).unwrap();

    let source = Arc::new(CsvLedgerSource::new(&input, NormalizeOptions::default()));
    let orchestrator = Orchestrator::new(source, BatchAnalyzer::default(), temp.path().join("out"));
    let outcome = orchestrator.run().await.unwrap();
    (outcome, temp)
}

#[tokio::test]
async fn test_pipeline_matches_fifo_and_flags_quick_turns() {
    let (outcome, _temp) = run_pipeline().await;
    let batch = &outcome.batch;

    let eur = &batch.reports[&Instrument::new("EURUSD")];
    // Buy 10k @09:00, Buy 5k @09:30, Sell 12k @09:30 (file order breaks the tie)
    assert_eq!(eur.holdings.len(), 2);
    assert_eq!(eur.holdings[0].quantity.to_canonical_string(), "10000");
    assert_eq!(eur.holdings[0].duration_minutes().to_canonical_string(), "30");
    assert_eq!(eur.holdings[1].quantity.to_canonical_string(), "2000");
    assert_eq!(eur.holdings[1].duration_minutes().to_canonical_string(), "0");
    assert_eq!(eur.open_lots.len(), 1);
    assert_eq!(eur.open_lots[0].remaining_quantity.to_canonical_string(), "3000");
    assert!(eur.trades[2].toxicity_flag().is_toxic());
    assert_eq!(eur.trades[2].cumulative_realized_pl.to_canonical_string(), "1234.56");

    let gbp = &batch.reports[&Instrument::new("GBPUSD")];
    assert_eq!(gbp.holdings.len(), 1);
    assert_eq!(gbp.holdings[0].term_bucket.label(), "Swing");
    assert_eq!(gbp.closing_position().to_canonical_string(), "0");

    assert!(batch.failures.contains_key(&Instrument::new("XAUUSD")));
    assert!(!batch.reports.contains_key(&Instrument::new("XAUUSD")));
}

#[tokio::test]
async fn test_pipeline_writes_exports() {
    let (outcome, temp) = run_pipeline().await;
    let out = temp.path().join("out");

    let holdings = std::fs::read_to_string(out.join(HOLDINGS_FILE)).unwrap();
    let lines: Vec<_> = holdings.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "EURUSD,Long,2024-08-01 09:00:00,2024-08-01 09:30:00,10000,30,Intraday"
    );
    assert_eq!(
        lines[3],
        "GBPUSD,Short,2024-08-01 09:31:00,2024-08-02 09:31:00,2000,1440,Swing"
    );

    let trades = std::fs::read_to_string(out.join(TRADES_FILE)).unwrap();
    assert_eq!(trades.lines().count(), 1 + 5);
    assert!(trades.contains("Toxic (Quick Turn)"));

    let open = std::fs::read_to_string(out.join(OPEN_POSITIONS_FILE)).unwrap();
    assert_eq!(open.lines().count(), 2);

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&outcome.files.summary).unwrap()).unwrap();
    assert_eq!(summary["instrumentsFailed"], 1);
    assert_eq!(summary["failures"][0]["instrument"], "XAUUSD");
    assert!(summary["failures"][0]["error"]
        .as_str()
        .unwrap()
        .contains("unrecognized side"));
}

#[tokio::test]
async fn test_pipeline_is_byte_identical_across_runs() {
    let (_first, first_dir) = run_pipeline().await;
    let (_second, second_dir) = run_pipeline().await;

    for file in [TRADES_FILE, HOLDINGS_FILE, OPEN_POSITIONS_FILE] {
        let a = std::fs::read(first_dir.path().join("out").join(file)).unwrap();
        let b = std::fs::read(second_dir.path().join("out").join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}
