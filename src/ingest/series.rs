//! Row-set to heart-rate series reduction
//!
//! Handles the timestamp zoo of consumer exports: epoch milliseconds,
//! epoch seconds, and several calendar spellings (with `/` normalized to
//! `-` as a last resort). Rows without a parseable timestamp or a finite
//! positive heart rate are dropped silently.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::estimate::workout::{HeartRateSample, HeartRateSeries};

/// Minimum valid rows for a usable import
pub const MIN_SERIES_ROWS: usize = 2;

/// Calendar formats tried, in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse one timestamp cell
///
/// Tries, in order: a 13-digit value as epoch milliseconds, a 10-digit
/// value as epoch seconds, calendar parsing, and calendar parsing with
/// forward slashes normalized to hyphens.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        if trimmed.len() == 13 {
            let millis: i64 = trimmed.parse().ok()?;
            return Utc.timestamp_millis_opt(millis).single();
        }
        if trimmed.len() == 10 {
            let secs: i64 = trimmed.parse().ok()?;
            return Utc.timestamp_opt(secs, 0).single();
        }
        return None;
    }

    if let Some(ts) = parse_calendar(trimmed) {
        return Some(ts);
    }
    if trimmed.contains('/') {
        return parse_calendar(&trimmed.replace('/', "-"));
    }
    None
}

fn parse_calendar(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

/// Reduce parsed rows into a time-ordered heart-rate series
///
/// Rows missing either column, with an unparseable timestamp, or with a
/// non-finite/non-positive heart rate are dropped. The result is sorted by
/// timestamp; duplicate timestamps are kept.
pub fn to_heart_rate_series(
    rows: &[HashMap<String, String>],
    time_column: &str,
    hr_column: &str,
) -> HeartRateSeries {
    let mut series: HeartRateSeries = rows
        .iter()
        .filter_map(|row| {
            let timestamp = parse_timestamp(row.get(time_column)?)?;
            let bpm: f64 = row.get(hr_column)?.trim().parse().ok()?;
            if !bpm.is_finite() || bpm <= 0.0 {
                return None;
            }
            Some(HeartRateSample { timestamp, bpm })
        })
        .collect();

    series.sort_by_key(|s| s.timestamp);
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::delimited::parse_delimited;

    #[test]
    fn test_epoch_milliseconds() {
        let ts = parse_timestamp("1700000000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_epoch_seconds() {
        let ts = parse_timestamp("1700000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_other_digit_lengths_rejected() {
        assert!(parse_timestamp("12345").is_none());
        assert!(parse_timestamp("123456789012").is_none());
    }

    #[test]
    fn test_calendar_formats() {
        assert!(parse_timestamp("2026-01-05 08:30:00").is_some());
        assert!(parse_timestamp("2026-01-05T08:30:00").is_some());
        assert!(parse_timestamp("2026-01-05 08:30").is_some());
        assert!(parse_timestamp("2026-01-05").is_some());
        assert!(parse_timestamp("2026-01-05T08:30:00Z").is_some());
    }

    #[test]
    fn test_slash_normalization() {
        let slashed = parse_timestamp("2026/01/05 08:30:00").unwrap();
        let dashed = parse_timestamp("2026-01-05 08:30:00").unwrap();
        assert_eq!(slashed, dashed);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("--:--").is_none());
    }

    #[test]
    fn test_series_conversion_drops_bad_rows() {
        let t = parse_delimited(
            "time,hr\n\
             2026-01-05 08:00:00,120\n\
             not-a-time,130\n\
             2026-01-05 08:01:00,abc\n\
             2026-01-05 08:02:00,-5\n\
             2026-01-05 08:03:00,140\n",
        )
        .unwrap();
        let series = to_heart_rate_series(&t.rows, "time", "hr");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].bpm, 120.0);
        assert_eq!(series[1].bpm, 140.0);
    }

    #[test]
    fn test_series_is_sorted() {
        let t = parse_delimited(
            "time,hr\n\
             2026-01-05 08:05:00,150\n\
             2026-01-05 08:00:00,120\n",
        )
        .unwrap();
        let series = to_heart_rate_series(&t.rows, "time", "hr");
        assert!(series[0].timestamp < series[1].timestamp);
        assert_eq!(series[0].bpm, 120.0);
    }

    #[test]
    fn test_mixed_timestamp_encodings_in_one_file() {
        let t = parse_delimited(
            "time,hr\n\
             1700000000,120\n\
             1700000060000,130\n",
        )
        .unwrap();
        let series = to_heart_rate_series(&t.rows, "time", "hr");
        assert_eq!(series.len(), 2);
        assert_eq!(
            (series[1].timestamp - series[0].timestamp).num_seconds(),
            60
        );
    }
}
