//! Estimation MCP Tools
//!
//! Thin bridges between the MCP surface, the pure estimation engine, and
//! the record store. All numeric work happens in `crate::estimate`; this
//! layer loads the profile, shapes responses, and persists confirmed
//! estimates.

use serde::Serialize;

use crate::db::Database;
use crate::estimate::{
    bounded_range, estimate_food_text, kcal_from_average, reconcile_estimates, training_load,
    CalorieRange, FoodEstimate, FoodTable, MacroSet, ReconciledEstimate,
};
use crate::models::{LogRecord, Profile, RecordCreate, RecordKind};

/// Stored uncertainty for heart-rate-derived records. The model is a
/// population regression; a fixed moderate tier is more honest than
/// pretending per-call precision.
const WORKOUT_UNCERTAINTY: f64 = 0.20;

/// Response for estimate_food
#[derive(Debug, Serialize)]
pub struct FoodEstimateResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<FoodEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for log_meal
#[derive(Debug, Serialize)]
pub struct LogRecordResponse {
    pub record: LogRecord,
    pub explanation: String,
    pub followups: Vec<String>,
    /// Present when a second opinion was reconciled in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciledEstimate>,
}

/// Response for estimate_workout
#[derive(Debug, Serialize)]
pub struct WorkoutEstimateResponse {
    pub kcal: u32,
    pub minutes: f64,
    pub avg_hr: f64,
    /// Zero when the profile has no resting/max heart rate
    pub training_load: f64,
}

/// Estimate calories from a free-text food description (nothing persisted)
pub fn estimate_food(table: &FoodTable, text: &str) -> FoodEstimateResponse {
    match estimate_food_text(table, text) {
        Some(estimate) => FoodEstimateResponse {
            ok: true,
            estimate: Some(estimate),
            message: None,
        },
        None => FoodEstimateResponse {
            ok: false,
            estimate: None,
            message: Some(
                "no usable signal in text; provide a food name, a weight, or a calorie value"
                    .to_string(),
            ),
        },
    }
}

/// Estimate and persist a meal record
///
/// When `second_opinion_kcal` is given, the text estimate and the second
/// opinion are reconciled before storing; disagreement raises the stored
/// uncertainty instead of being averaged away.
pub fn log_meal(
    db: &Database,
    table: &FoodTable,
    text: &str,
    title: Option<String>,
    second_opinion_kcal: Option<f64>,
    note: Option<String>,
) -> Result<LogRecordResponse, String> {
    let estimate = estimate_food_text(table, text)
        .ok_or_else(|| "no usable signal in text; nothing to log".to_string())?;

    let (range, reconciliation) = match second_opinion_kcal {
        Some(second) if second > 0.0 => {
            let merged = reconcile_estimates(
                f64::from(estimate.range.mid),
                second,
                estimate.range.uncertainty,
                None,
                None,
            );
            let range = bounded_range(f64::from(merged.kcal), merged.uncertainty);
            (range, Some(merged))
        }
        _ => (estimate.range, None),
    };

    let data = RecordCreate {
        kind: RecordKind::Meal,
        logged_at: None,
        title: title.unwrap_or_else(|| text.trim().to_string()),
        range,
        minutes: None,
        avg_hr: None,
        training_load: None,
        note,
    };

    let record = db
        .with_conn(|conn| LogRecord::create(conn, &data))
        .map_err(|e| e.to_string())?;

    Ok(LogRecordResponse {
        record,
        explanation: estimate.explanation,
        followups: estimate.followups,
        reconciliation,
    })
}

/// Estimate a workout from an average heart rate, using the stored profile
pub fn estimate_workout(
    db: &Database,
    avg_hr: f64,
    minutes: f64,
) -> Result<WorkoutEstimateResponse, String> {
    let profile = load_profile(db)?;
    Ok(workout_response(&profile, avg_hr, minutes))
}

/// Estimate and persist a workout record
pub fn log_workout(
    db: &Database,
    avg_hr: f64,
    minutes: f64,
    title: Option<String>,
    note: Option<String>,
) -> Result<LogRecordResponse, String> {
    let profile = load_profile(db)?;
    let estimate = workout_response(&profile, avg_hr, minutes);

    let data = RecordCreate {
        kind: RecordKind::Workout,
        logged_at: None,
        title: title.unwrap_or_else(|| format!("workout {} min @ {} bpm", minutes, avg_hr)),
        range: bounded_range(f64::from(estimate.kcal), WORKOUT_UNCERTAINTY),
        minutes: Some(estimate.minutes),
        avg_hr: Some(estimate.avg_hr),
        training_load: Some(estimate.training_load),
        note,
    };

    let record = db
        .with_conn(|conn| LogRecord::create(conn, &data))
        .map_err(|e| e.to_string())?;

    Ok(LogRecordResponse {
        record,
        explanation: format!(
            "{} kcal over {} min at {} bpm average",
            estimate.kcal, estimate.minutes, estimate.avg_hr
        ),
        followups: Vec::new(),
        reconciliation: None,
    })
}

/// Reconcile two independent calorie estimates for the same event
pub fn reconcile(
    a_kcal: f64,
    b_kcal: f64,
    base_uncertainty: f64,
    a_macros: Option<MacroSet>,
    b_macros: Option<MacroSet>,
) -> ReconciledEstimate {
    reconcile_estimates(a_kcal, b_kcal, base_uncertainty, a_macros, b_macros)
}

pub(crate) fn load_profile(db: &Database) -> Result<Profile, String> {
    db.with_conn(Profile::get)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "profile not set; call set_profile first".to_string())
}

pub(crate) fn workout_response(
    profile: &Profile,
    avg_hr: f64,
    minutes: f64,
) -> WorkoutEstimateResponse {
    let kcal = kcal_from_average(
        profile.sex,
        avg_hr,
        minutes,
        profile.weight_kg,
        profile.age_years,
        profile.cal_factor,
    );
    let load = match (profile.hr_rest, profile.hr_max) {
        (Some(rest), Some(max)) => training_load(minutes, avg_hr, rest, max, profile.sex),
        _ => 0.0,
    };
    WorkoutEstimateResponse {
        kcal,
        minutes,
        avg_hr,
        training_load: load,
    }
}

/// Range stored for a heart-rate-derived estimate
pub(crate) fn workout_record_range(kcal: u32) -> CalorieRange {
    bounded_range(f64::from(kcal), WORKOUT_UNCERTAINTY)
}
