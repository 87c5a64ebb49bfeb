//! Delimited-text parsing
//!
//! First row is the header. The delimiter is whichever candidate splits the
//! header into the most fields - a cheap but effective heuristic for
//! unknown-origin exports. Double-quoted fields are supported: the quote
//! toggles a no-split state and is stripped from the value.

use std::collections::HashMap;

/// Delimiters tried against the header line
const DELIMITER_CANDIDATES: &[char] = &[',', '\t', ';', '|'];

/// Header substrings marking the time column
const TIME_COLUMN_HINTS: &[&str] = &["time", "date", "stamp", "时间", "日期"];

/// Header substrings marking the heart-rate column
const HR_COLUMN_HINTS: &[&str] = &["hr", "heart", "bpm", "pulse", "心率"];

/// A parsed delimited table: header names plus one name->value map per row
#[derive(Debug, Clone)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
    pub delimiter: char,
}

/// Parse raw delimited text into a table
///
/// Returns `None` when there is no header line at all. Data rows with the
/// wrong field count are kept as far as they go - downstream conversion
/// drops what it cannot use.
pub fn parse_delimited(raw: &str) -> Option<DelimitedTable> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next()?;

    let delimiter = detect_delimiter(header_line);
    let headers: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = lines
        .map(|line| {
            let fields = split_line(line, delimiter);
            headers
                .iter()
                .zip(fields)
                .map(|(h, f)| (h.clone(), f.trim().to_string()))
                .collect::<HashMap<String, String>>()
        })
        .collect();

    Some(DelimitedTable {
        headers,
        rows,
        delimiter,
    })
}

/// Pick the candidate delimiter that splits the header into the most fields
fn detect_delimiter(header: &str) -> char {
    let mut best = ',';
    let mut best_count = 0;
    for &candidate in DELIMITER_CANDIDATES {
        let count = split_line(header, candidate).len();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Split one line on the delimiter, honoring double quotes
///
/// A quote character toggles the no-split state rather than escaping;
/// quotes themselves are stripped from the field.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

/// Find the time column by header name, defaulting to the first column
pub fn detect_time_column(headers: &[String]) -> Option<String> {
    detect_column(headers, TIME_COLUMN_HINTS)
}

/// Find the heart-rate column by header name, defaulting to the first column
pub fn detect_hr_column(headers: &[String]) -> Option<String> {
    detect_column(headers, HR_COLUMN_HINTS)
}

fn detect_column(headers: &[String], hints: &[&str]) -> Option<String> {
    for header in headers {
        let lower = header.to_lowercase();
        if hints.iter().any(|hint| lower.contains(hint)) {
            return Some(header.clone());
        }
    }
    headers.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_delimiter() {
        let t = parse_delimited("time,hr\n1,2\n").unwrap();
        assert_eq!(t.delimiter, ',');
        assert_eq!(t.headers, vec!["time", "hr"]);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0]["hr"], "2");
    }

    #[test]
    fn test_semicolon_and_pipe_and_tab() {
        assert_eq!(parse_delimited("a;b;c\n").unwrap().delimiter, ';');
        assert_eq!(parse_delimited("a|b|c\n").unwrap().delimiter, '|');
        assert_eq!(parse_delimited("a\tb\tc\n").unwrap().delimiter, '\t');
    }

    #[test]
    fn test_quoted_field_with_embedded_delimiter() {
        let t = parse_delimited("name,value\n\"a, b\",3\n").unwrap();
        assert_eq!(t.rows[0]["name"], "a, b");
        assert_eq!(t.rows[0]["value"], "3");
    }

    #[test]
    fn test_quotes_stripped() {
        let t = parse_delimited("a,b\n\"x\",\"y\"\n").unwrap();
        assert_eq!(t.rows[0]["a"], "x");
        assert_eq!(t.rows[0]["b"], "y");
    }

    #[test]
    fn test_short_row_keeps_leading_fields() {
        let t = parse_delimited("a,b,c\n1,2\n").unwrap();
        assert_eq!(t.rows[0].get("a").map(String::as_str), Some("1"));
        assert_eq!(t.rows[0].get("c"), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_delimited("").is_none());
        assert!(parse_delimited("\n\n").is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let t = parse_delimited("a,b\n\n1,2\n\n3,4\n").unwrap();
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn test_time_column_detection() {
        let headers: Vec<String> = ["Timestamp", "HeartRate"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(detect_time_column(&headers).unwrap(), "Timestamp");
        assert_eq!(detect_hr_column(&headers).unwrap(), "HeartRate");
    }

    #[test]
    fn test_column_detection_variants() {
        let headers: Vec<String> = ["日期", "pulse (bpm)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(detect_time_column(&headers).unwrap(), "日期");
        assert_eq!(detect_hr_column(&headers).unwrap(), "pulse (bpm)");
    }

    #[test]
    fn test_column_detection_defaults_to_first() {
        let headers: Vec<String> = ["col_a", "col_b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(detect_time_column(&headers).unwrap(), "col_a");
        assert_eq!(detect_hr_column(&headers).unwrap(), "col_a");
    }
}
