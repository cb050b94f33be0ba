//! Result export: CSV files for the annotated trades, holding times and open
//! positions, plus a JSON run summary.

use crate::analysis::BatchReport;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TRADES_FILE: &str = "processed_trading_activity.csv";
pub const HOLDINGS_FILE: &str = "processed_holding_times.csv";
pub const OPEN_POSITIONS_FILE: &str = "open_positions.csv";
pub const SUMMARY_FILE: &str = "analysis_summary.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    instrument: &'a str,
    trade_time: String,
    side: String,
    quantity: String,
    realized_pl: String,
    signed_quantity: String,
    cumulative_position: String,
    cumulative_pl: String,
    seconds_since_previous: Option<i64>,
    previous_side: Option<String>,
    toxicity: &'static str,
    trade_key: &'a str,
}

#[derive(Debug, Serialize)]
struct HoldingRow<'a> {
    instrument: &'a str,
    lot_side: String,
    open_time: String,
    close_time: String,
    quantity: String,
    duration_minutes: String,
    term: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenLotRow<'a> {
    instrument: &'a str,
    lot_side: String,
    open_time: String,
    remaining_quantity: String,
    opened_by: &'a str,
}

/// Write the annotated trade sequence.
pub fn write_trades_csv<W: Write>(writer: W, batch: &BatchReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for annotated in batch.annotated_trades() {
        let trade = &annotated.trade;
        csv.serialize(TradeRow {
            instrument: trade.instrument.as_str(),
            trade_time: trade.time_ms.format_utc(),
            side: trade.side.to_string(),
            quantity: trade.quantity.to_canonical_string(),
            realized_pl: trade.realized_pl.to_canonical_string(),
            signed_quantity: annotated.signed_quantity.to_canonical_string(),
            cumulative_position: annotated.cumulative_position.to_canonical_string(),
            cumulative_pl: annotated.cumulative_realized_pl.to_canonical_string(),
            seconds_since_previous: annotated.toxicity.since_previous.map(|d| d.num_seconds()),
            previous_side: annotated.toxicity.previous_side.map(|s| s.to_string()),
            toxicity: annotated.toxicity.flag.label(),
            trade_key: trade.trade_key(),
        })?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write holding records in emission order.
pub fn write_holdings_csv<W: Write>(writer: W, batch: &BatchReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for holding in batch.holding_records() {
        csv.serialize(HoldingRow {
            instrument: holding.instrument.as_str(),
            lot_side: holding.lot_side.to_string(),
            open_time: holding.open_time.format_utc(),
            close_time: holding.close_time.format_utc(),
            quantity: holding.quantity.to_canonical_string(),
            duration_minutes: holding.duration_minutes().to_canonical_string(),
            term: holding.term_bucket.label(),
        })?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write lots still open at the end of the batch.
pub fn write_open_positions_csv<W: Write>(
    writer: W,
    batch: &BatchReport,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for (instrument, lot) in batch.open_lots() {
        csv.serialize(OpenLotRow {
            instrument: instrument.as_str(),
            lot_side: lot.side.to_string(),
            open_time: lot.open_time.format_utc(),
            remaining_quantity: lot.remaining_quantity.to_canonical_string(),
            opened_by: &lot.opened_by,
        })?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Paths of the files written by [`export_to_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub trades: PathBuf,
    pub holdings: PathBuf,
    pub open_positions: PathBuf,
    pub summary: PathBuf,
}

/// Write every export file into `dir`, creating it if needed.
pub async fn export_to_dir(dir: &Path, batch: &BatchReport) -> Result<ExportedFiles, ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.display().to_string(),
            source,
        })?;

    let mut trades = Vec::new();
    write_trades_csv(&mut trades, batch)?;
    let mut holdings = Vec::new();
    write_holdings_csv(&mut holdings, batch)?;
    let mut open_positions = Vec::new();
    write_open_positions_csv(&mut open_positions, batch)?;
    let summary = serde_json::to_vec_pretty(&batch.summary())?;

    let files = ExportedFiles {
        trades: dir.join(TRADES_FILE),
        holdings: dir.join(HOLDINGS_FILE),
        open_positions: dir.join(OPEN_POSITIONS_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    write_file(&files.trades, trades).await?;
    write_file(&files.holdings, holdings).await?;
    write_file(&files.open_positions, open_positions).await?;
    write_file(&files.summary, summary).await?;

    tracing::info!(dir = %dir.display(), "Exported analysis results");
    Ok(files)
}

async fn write_file(path: &Path, bytes: Vec<u8>) -> Result<(), ExportError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}
