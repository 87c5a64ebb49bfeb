//! Profile model
//!
//! Stores the single-row set of estimator inputs: sex, age, weight,
//! optional resting/max heart rate, and the calibration factor that
//! linearly scales all energy-expenditure outputs.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimate::Sex;

/// Calibration factor bounds; a wearable-vs-model correction, not a free knob
pub const MIN_CAL_FACTOR: f64 = 0.7;
pub const MAX_CAL_FACTOR: f64 = 1.3;

/// Estimator input profile (single-row table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub sex: Sex,
    pub age_years: f64,
    pub weight_kg: f64,
    pub hr_rest: Option<f64>,
    pub hr_max: Option<f64>,
    pub cal_factor: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let sex_str: String = row.get("sex")?;
        Ok(Self {
            id: row.get("id")?,
            sex: Sex::from_str(&sex_str).unwrap_or_default(),
            age_years: row.get("age_years")?,
            weight_kg: row.get("weight_kg")?,
            hr_rest: row.get("hr_rest")?,
            hr_max: row.get("hr_max")?,
            cal_factor: row.get("cal_factor")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or update the profile (upsert)
    ///
    /// The calibration factor is clamped into [0.7, 1.3] on write.
    pub fn set(
        conn: &Connection,
        sex: Sex,
        age_years: f64,
        weight_kg: f64,
        hr_rest: Option<f64>,
        hr_max: Option<f64>,
        cal_factor: f64,
    ) -> DbResult<Self> {
        let cal_factor = if cal_factor.is_finite() {
            cal_factor.clamp(MIN_CAL_FACTOR, MAX_CAL_FACTOR)
        } else {
            1.0
        };

        conn.execute(
            r#"
            INSERT INTO profile (id, sex, age_years, weight_kg, hr_rest, hr_max, cal_factor)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                sex = excluded.sex,
                age_years = excluded.age_years,
                weight_kg = excluded.weight_kg,
                hr_rest = excluded.hr_rest,
                hr_max = excluded.hr_max,
                cal_factor = excluded.cal_factor,
                updated_at = datetime('now')
            "#,
            params![sex.as_str(), age_years, weight_kg, hr_rest, hr_max, cal_factor],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}
