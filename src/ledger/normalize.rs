//! CSV ledger normalization: raw broker export rows into ordered trades.

use super::clean::{parse_amount, parse_timestamp};
use super::{Ledger, LedgerError};
use crate::config::DEFAULT_DATE_FORMAT;
use crate::domain::{Decimal, Instrument, Side, Trade};
use crate::engine::{EngineError, MalformedReason};
use serde::Deserialize;

/// How to read the raw ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub date_format: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Instrument")]
    instrument: String,
    #[serde(rename = "Transfer Date")]
    transfer_date: String,
    #[serde(rename = "Buy/Sell")]
    side: String,
    #[serde(rename = "Trade Amount")]
    trade_amount: String,
    #[serde(rename = "Settled PL", default)]
    settled_pl: Option<String>,
}

/// Parse a ledger export into per-instrument, time-ordered trades.
///
/// Rows that name an instrument but carry an unusable field are recorded as a
/// rejection of that instrument. Rows with no instrument are skipped. A broken
/// CSV structure fails the whole load.
pub fn normalize_csv(bytes: &[u8], options: &NormalizeOptions) -> Result<Ledger, LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut trades = Vec::new();
    let mut rejections = Vec::new();
    let mut skipped_rows = Vec::new();

    for (idx, record) in reader.deserialize::<Row>().enumerate() {
        let source_row = idx as u64 + 1;
        let row = record.map_err(|e| LedgerError::Csv(format!("row {}: {}", source_row, e)))?;

        if row.instrument.is_empty() {
            tracing::warn!(row = source_row, "Skipping ledger row without instrument");
            skipped_rows.push(source_row);
            continue;
        }

        let instrument = Instrument::new(row.instrument.clone());
        match row_to_trade(row, source_row, options) {
            Ok(trade) => trades.push(trade),
            Err(reason) => {
                tracing::warn!(row = source_row, instrument = %instrument, %reason, "Rejecting ledger row");
                rejections.push(EngineError::MalformedInput {
                    instrument,
                    record: format!("row {}", source_row),
                    reason,
                });
            }
        }
    }

    let mut ledger = Ledger::from_trades(trades);
    for rejection in rejections {
        ledger.reject(rejection);
    }
    ledger.skipped_rows = skipped_rows;
    Ok(ledger)
}

fn row_to_trade(
    row: Row,
    source_row: u64,
    options: &NormalizeOptions,
) -> Result<Trade, MalformedReason> {
    let side = Side::parse(&row.side).ok_or(MalformedReason::UnrecognizedSide(row.side.clone()))?;

    let time_ms = parse_timestamp(&row.transfer_date, &options.date_format).ok_or_else(|| {
        unparseable("Transfer Date", &row.transfer_date)
    })?;

    let quantity = match parse_amount(&row.trade_amount) {
        Ok(Some(q)) => q,
        _ => return Err(unparseable("Trade Amount", &row.trade_amount)),
    };
    if quantity.is_negative() {
        return Err(MalformedReason::NegativeQuantity(quantity));
    }

    let raw_pl = row.settled_pl.unwrap_or_default();
    let realized_pl = parse_amount(&raw_pl)
        .map_err(|_| unparseable("Settled PL", &raw_pl))?
        .unwrap_or_else(Decimal::zero);

    Ok(Trade::new(
        Instrument::new(row.instrument),
        time_ms,
        side,
        quantity,
        realized_pl,
        source_row,
    ))
}

fn unparseable(field: &str, value: &str) -> MalformedReason {
    MalformedReason::UnparseableField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeMs;

    const HEADER: &str = "Instrument,Transfer Date,Buy/Sell,Trade Amount,Settled PL\n";

    fn parse(body: &str) -> Ledger {
        let csv = format!("{}{}", HEADER, body);
        normalize_csv(csv.as_bytes(), &NormalizeOptions::default()).unwrap()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_rows_are_grouped_and_sorted() {
        let ledger = parse(
            "EURUSD,8/1/24 10:00,Sell,\"1,000\",\"1,250.50\"\n\
             GBPUSD,8/1/24 09:00,Buy,500,—\n\
             EURUSD,8/1/24 09:30,Buy,\"1,000\",—\n",
        );

        assert_eq!(ledger.instrument_count(), 2);
        let eur = &ledger.trades()[&Instrument::new("EURUSD")];
        assert_eq!(eur.len(), 2);
        assert_eq!(eur[0].side, Side::Buy);
        assert_eq!(eur[0].source_row, 3);
        assert_eq!(eur[0].realized_pl, Decimal::zero());
        assert_eq!(eur[1].quantity, d("1000"));
        assert_eq!(eur[1].realized_pl, d("1250.5"));
        assert!(eur[0].time_ms < eur[1].time_ms);
        assert!(ledger.rejections().is_empty());
    }

    #[test]
    fn test_missing_settled_pl_column_defaults_to_zero() {
        let csv = "Instrument,Transfer Date,Buy/Sell,Trade Amount\nEURUSD,8/1/24 10:00,Buy,5\n";
        let ledger = normalize_csv(csv.as_bytes(), &NormalizeOptions::default()).unwrap();
        let eur = &ledger.trades()[&Instrument::new("EURUSD")];
        assert_eq!(eur[0].realized_pl, Decimal::zero());
    }

    #[test]
    fn test_bad_side_rejects_instrument() {
        let ledger = parse(
            "EURUSD,8/1/24 10:00,Buy,1,0\n\
             EURUSD,8/1/24 10:05,Hold,1,0\n\
             GBPUSD,8/1/24 10:00,Buy,1,0\n",
        );

        let err = &ledger.rejections()[&Instrument::new("EURUSD")];
        match err {
            EngineError::MalformedInput { record, reason, .. } => {
                assert_eq!(record, "row 2");
                assert_eq!(reason, &MalformedReason::UnrecognizedSide("Hold".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!ledger.rejections().contains_key(&Instrument::new("GBPUSD")));
    }

    #[test]
    fn test_bad_date_and_amount_are_unparseable() {
        let ledger = parse(
            "AAA,not a date,Buy,1,0\n\
             BBB,8/1/24 10:00,Buy,lots,0\n\
             CCC,8/1/24 10:00,Buy,1,oops\n",
        );
        for (name, field) in [("AAA", "Transfer Date"), ("BBB", "Trade Amount"), ("CCC", "Settled PL")] {
            match &ledger.rejections()[&Instrument::new(name)] {
                EngineError::MalformedInput {
                    reason: MalformedReason::UnparseableField { field: f, .. },
                    ..
                } => assert_eq!(f, field),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let ledger = parse("EURUSD,8/1/24 10:00,Buy,-3,0\n");
        assert!(matches!(
            ledger.rejections()[&Instrument::new("EURUSD")],
            EngineError::MalformedInput {
                reason: MalformedReason::NegativeQuantity(_),
                ..
            }
        ));
    }

    #[test]
    fn test_blank_instrument_skipped() {
        let ledger = parse(",8/1/24 10:00,Buy,1,0\nEURUSD,8/1/24 10:00,Buy,1,0\n");
        assert_eq!(ledger.skipped_rows, vec![1]);
        assert_eq!(ledger.trade_count(), 1);
    }

    #[test]
    fn test_custom_date_format() {
        let csv = format!("{}EURUSD,2024-08-01T10:00:30,Buy,1,0\n", HEADER);
        let options = NormalizeOptions {
            date_format: "%Y-%m-%dT%H:%M:%S".to_string(),
        };
        let ledger = normalize_csv(csv.as_bytes(), &options).unwrap();
        let trade = &ledger.trades()[&Instrument::new("EURUSD")][0];
        assert_eq!(trade.time_ms.format_utc(), "2024-08-01 10:00:30");
        assert!(trade.time_ms > TimeMs::new(0));
    }
}
