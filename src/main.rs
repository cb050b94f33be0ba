use anyhow::Context;
use std::sync::Arc;
use tradelens::ledger::NormalizeOptions;
use tradelens::orchestration::Orchestrator;
use tradelens::{config::Config, BatchAnalyzer, CsvLedgerSource, LedgerSource};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let source: Arc<dyn LedgerSource> = Arc::new(CsvLedgerSource::new(
        &config.input_path,
        NormalizeOptions {
            date_format: config.date_format.clone(),
        },
    ));
    let orchestrator = Orchestrator::new(
        source,
        BatchAnalyzer::new(config.analysis),
        &config.output_dir,
    );

    let outcome = orchestrator
        .run()
        .await
        .with_context(|| format!("analysis of {} failed", config.input_path))?;

    for (instrument, error) in &outcome.batch.failures {
        tracing::warn!(instrument = %instrument, error = %error, "Instrument skipped");
    }
    tracing::info!(
        trades = %outcome.files.trades.display(),
        holdings = %outcome.files.holdings.display(),
        "Files ready"
    );

    Ok(())
}
