//! Profile MCP Tools
//!
//! Tools for reading and updating the single-row estimator profile.

use crate::db::Database;
use crate::estimate::Sex;
use crate::models::Profile;

/// Get the stored profile
pub fn get_profile(db: &Database) -> Result<Option<Profile>, String> {
    db.with_conn(Profile::get).map_err(|e| e.to_string())
}

/// Set or update the profile
///
/// `sex` accepts "male"/"female" (and m/f/男/女). The calibration factor
/// is clamped by the model layer.
pub fn set_profile(
    db: &Database,
    sex: &str,
    age_years: f64,
    weight_kg: f64,
    hr_rest: Option<f64>,
    hr_max: Option<f64>,
    cal_factor: f64,
) -> Result<Profile, String> {
    let sex = Sex::from_str(sex)
        .ok_or_else(|| format!("Unknown sex '{}'; expected male or female", sex))?;

    if !(age_years > 0.0) || !(weight_kg > 0.0) {
        return Err("age_years and weight_kg must be positive".to_string());
    }
    if let (Some(rest), Some(max)) = (hr_rest, hr_max) {
        if max <= rest {
            return Err(format!(
                "hr_max ({}) must be greater than hr_rest ({})",
                max, rest
            ));
        }
    }

    db.with_conn(|conn| Profile::set(conn, sex, age_years, weight_kg, hr_rest, hr_max, cal_factor))
        .map_err(|e| e.to_string())
}
