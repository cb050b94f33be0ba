//! Locale cleanup for raw ledger cells.

use crate::domain::{Decimal, TimeMs};
use chrono::NaiveDateTime;

/// Cell values that mean "no amount" in the broker export.
const MISSING_MARKERS: &[&str] = &["", "—", "–", "-", "--", "n/a", "nan"];

/// Drop thousands separators and every kind of embedded space.
pub fn strip_locale(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ',' | '\u{a0}' | '\u{202f}') && !c.is_whitespace())
        .collect()
}

/// Parse a monetary or size cell.
///
/// Returns `Ok(None)` for a missing-value marker such as an em dash.
pub fn parse_amount(raw: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let cleaned = strip_locale(raw);
    if MISSING_MARKERS.contains(&cleaned.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    Decimal::from_str_lenient(&cleaned).map(Some)
}

/// Parse a ledger timestamp with a `chrono` format string, interpreted as UTC.
pub fn parse_timestamp(raw: &str, format: &str) -> Option<TimeMs> {
    NaiveDateTime::parse_from_str(raw.trim(), format)
        .ok()
        .map(TimeMs::from_naive_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMAT;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_thousands_separators_removed() {
        assert_eq!(parse_amount("1,234,567.5").unwrap(), Some(d("1234567.5")));
        assert_eq!(parse_amount(" -2,500 ").unwrap(), Some(d("-2500")));
        assert_eq!(parse_amount("10\u{a0}000").unwrap(), Some(d("10000")));
    }

    #[test]
    fn test_missing_markers() {
        assert_eq!(parse_amount("—").unwrap(), None);
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("  ").unwrap(), None);
        assert_eq!(parse_amount("NaN").unwrap(), None);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_amount("12abc").is_err());
    }

    #[test]
    fn test_parse_default_date_format() {
        let t = parse_timestamp("8/1/24 9:30", DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(t.format_utc(), "2024-08-01 09:30:00");

        let t = parse_timestamp("09/15/24 14:05", DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(t.format_utc(), "2024-09-15 14:05:00");

        assert!(parse_timestamp("yesterday", DEFAULT_DATE_FORMAT).is_none());
    }
}
