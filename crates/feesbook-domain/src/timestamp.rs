//! Canonical timestamp handling for payment entries.
//!
//! Stored entry dates use exactly one format, `DD/MM/YYYY HH:MM:SS`. Every
//! parse and format goes through this module so report filters and receipts
//! never re-derive an ambiguous representation per screen.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Format of the `date` field on stored payment entries.
pub const ENTRY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Date-only prefix of [`ENTRY_FORMAT`], used by report range arguments.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Formats a timestamp into the stored entry representation.
pub fn format_entry(at: DateTime<Utc>) -> String {
    at.format(ENTRY_FORMAT).to_string()
}

/// Parses a stored entry timestamp. Returns `None` for anything that does
/// not match the canonical format; callers count these as malformed dates.
pub fn parse_entry(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), ENTRY_FORMAT).ok()
}

/// Parses a date-only value (`DD/MM/YYYY`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn round_trips_entry_timestamps() {
        let parsed = parse_entry("01/01/2024 10:00:00").expect("canonical format parses");
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.month(), 1);
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.hour(), 10);
    }

    #[test]
    fn rejects_non_canonical_formats() {
        assert!(parse_entry("2024-01-01T10:00:00").is_none());
        assert!(parse_entry("01/01/2024").is_none());
        assert!(parse_entry("").is_none());
    }

    #[test]
    fn parses_date_only_bounds() {
        let date = parse_date("15/03/2024").expect("date parses");
        assert_eq!((date.day(), date.month(), date.year()), (15, 3, 2024));
    }
}
