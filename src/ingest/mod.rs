//! Time-series ingestion
//!
//! Parses generic delimited text (heart-rate exports of unknown origin)
//! into header-keyed rows, auto-detects the delimiter and the time/heart-
//! rate columns, and reduces the rows into a time-ordered series for the
//! workout estimator. Partial or corrupt exports are expected input: rows
//! that fail to parse are dropped, not errors.

pub mod delimited;
pub mod series;

pub use delimited::{
    detect_hr_column, detect_time_column, parse_delimited, DelimitedTable,
};
pub use series::{parse_timestamp, to_heart_rate_series, MIN_SERIES_ROWS};
