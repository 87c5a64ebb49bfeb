//! Heart-rate series import
//!
//! Takes raw delimited text (already decoded; file handling belongs to the
//! caller), runs ingestion and the series estimator, and optionally stores
//! a workout record. Partial exports are expected: dropped rows are
//! counted, not errors.

use serde::Serialize;

use crate::db::Database;
use crate::estimate::{kcal_from_series, training_load, WorkoutEstimate};
use crate::ingest::{
    detect_hr_column, detect_time_column, parse_delimited, to_heart_rate_series, MIN_SERIES_ROWS,
};
use crate::models::{LogRecord, RecordCreate, RecordKind};
use crate::tools::estimates::{load_profile, workout_record_range};

/// Response for import_heart_rate_series
#[derive(Debug, Serialize)]
pub struct HrImportResponse {
    pub success: bool,
    pub message: String,
    pub delimiter: Option<char>,
    pub time_column: Option<String>,
    pub hr_column: Option<String>,
    pub total_rows: usize,
    pub used_rows: usize,
    pub dropped_rows: usize,
    pub estimate: WorkoutEstimate,
    pub training_load: f64,
    /// Set when the estimate was stored as a workout record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
}

impl HrImportResponse {
    fn rejected(message: String) -> Self {
        Self {
            success: false,
            message,
            delimiter: None,
            time_column: None,
            hr_column: None,
            total_rows: 0,
            used_rows: 0,
            dropped_rows: 0,
            estimate: WorkoutEstimate::default(),
            training_load: 0.0,
            record_id: None,
        }
    }
}

/// Ingest raw delimited heart-rate text and estimate the workout
///
/// An unusable import (no header, fewer than two valid rows) comes back as
/// `success: false` with a message - normal for corrupt exports, not an
/// error. Database and missing-profile failures are errors.
pub fn import_heart_rate_text(
    db: &Database,
    raw: &str,
    store: bool,
    title: Option<String>,
) -> Result<HrImportResponse, String> {
    let profile = load_profile(db)?;

    let table = match parse_delimited(raw) {
        Some(table) => table,
        None => return Ok(HrImportResponse::rejected("no header row found".to_string())),
    };

    let time_column = match detect_time_column(&table.headers) {
        Some(col) => col,
        None => return Ok(HrImportResponse::rejected("no columns found".to_string())),
    };
    let hr_column = match detect_hr_column(&table.headers) {
        Some(col) => col,
        None => return Ok(HrImportResponse::rejected("no columns found".to_string())),
    };

    let series = to_heart_rate_series(&table.rows, &time_column, &hr_column);
    let total_rows = table.rows.len();
    let used_rows = series.len();

    if used_rows < MIN_SERIES_ROWS {
        return Ok(HrImportResponse {
            success: false,
            message: format!(
                "insufficient data: {} valid rows of {} (need at least {})",
                used_rows, total_rows, MIN_SERIES_ROWS
            ),
            delimiter: Some(table.delimiter),
            time_column: Some(time_column),
            hr_column: Some(hr_column),
            total_rows,
            used_rows,
            dropped_rows: total_rows - used_rows,
            estimate: WorkoutEstimate::default(),
            training_load: 0.0,
            record_id: None,
        });
    }

    let estimate = kcal_from_series(
        profile.sex,
        &series,
        profile.weight_kg,
        profile.age_years,
        profile.cal_factor,
    );
    let load = match (profile.hr_rest, profile.hr_max) {
        (Some(rest), Some(max)) => {
            training_load(estimate.minutes, estimate.avg_hr, rest, max, profile.sex)
        }
        _ => 0.0,
    };

    let record_id = if store && estimate.kcal > 0 {
        let data = RecordCreate {
            kind: RecordKind::Workout,
            logged_at: None,
            title: title.unwrap_or_else(|| {
                format!("imported workout ({:.0} min)", estimate.minutes)
            }),
            range: workout_record_range(estimate.kcal),
            minutes: Some(estimate.minutes),
            avg_hr: Some(estimate.avg_hr),
            training_load: Some(load),
            note: None,
        };
        let record = db
            .with_conn(|conn| LogRecord::create(conn, &data))
            .map_err(|e| e.to_string())?;
        Some(record.id)
    } else {
        None
    };

    Ok(HrImportResponse {
        success: true,
        message: format!(
            "integrated {:.1} minutes from {} of {} rows",
            estimate.minutes, used_rows, total_rows
        ),
        delimiter: Some(table.delimiter),
        time_column: Some(time_column),
        hr_column: Some(hr_column),
        total_rows,
        used_rows,
        dropped_rows: total_rows - used_rows,
        estimate,
        training_load: load,
        record_id,
    })
}
