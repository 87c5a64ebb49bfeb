//! Log record model
//!
//! The persisted record of one estimated event (a meal or a workout),
//! keyed by id. Editing is a single atomic replace of the row - there is
//! no delete-and-reinsert sequencing.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::estimate::CalorieRange;

/// Record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Meal,
    Workout,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Meal => "meal",
            RecordKind::Workout => "workout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "meal" => Some(RecordKind::Meal),
            "workout" => Some(RecordKind::Workout),
            _ => None,
        }
    }
}

/// A logged estimate record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    pub kind: RecordKind,
    pub logged_at: String,
    pub title: String,
    pub range: CalorieRange,
    pub minutes: Option<f64>,
    pub avg_hr: Option<f64>,
    pub training_load: Option<f64>,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating (or replacing) a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreate {
    pub kind: RecordKind,
    pub logged_at: Option<String>,
    pub title: String,
    pub range: CalorieRange,
    pub minutes: Option<f64>,
    pub avg_hr: Option<f64>,
    pub training_load: Option<f64>,
    pub note: Option<String>,
}

impl LogRecord {
    /// Create a LogRecord from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind_str: String = row.get("kind")?;
        let kind = RecordKind::from_str(&kind_str).unwrap_or(RecordKind::Meal);

        Ok(Self {
            id: row.get("id")?,
            kind,
            logged_at: row.get("logged_at")?,
            title: row.get("title")?,
            range: CalorieRange {
                low: row.get::<_, i64>("kcal_low")?.max(0) as u32,
                mid: row.get::<_, i64>("kcal_mid")?.max(0) as u32,
                high: row.get::<_, i64>("kcal_high")?.max(0) as u32,
                uncertainty: row.get("uncertainty")?,
            },
            minutes: row.get("minutes")?,
            avg_hr: row.get("avg_hr")?,
            training_load: row.get("training_load")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new record
    pub fn create(conn: &Connection, data: &RecordCreate) -> DbResult<Self> {
        let logged_at = data.logged_at.clone().unwrap_or_else(|| {
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
        });

        conn.execute(
            r#"
            INSERT INTO records (
                kind, logged_at, title,
                kcal_low, kcal_mid, kcal_high, uncertainty,
                minutes, avg_hr, training_load, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                data.kind.as_str(),
                logged_at,
                data.title,
                i64::from(data.range.low),
                i64::from(data.range.mid),
                i64::from(data.range.high),
                data.range.uncertainty,
                data.minutes,
                data.avg_hr,
                data.training_load,
                data.note,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a record by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM records WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List records, newest first, optionally filtered by kind
    pub fn list(
        conn: &Connection,
        kind: Option<RecordKind>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let records = if let Some(kind) = kind {
            let mut stmt = conn.prepare(
                "SELECT * FROM records WHERE kind = ?1 ORDER BY logged_at DESC LIMIT ?2 OFFSET ?3",
            )?;
            let rows = stmt
                .query_map(params![kind.as_str(), limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(
                "SELECT * FROM records ORDER BY logged_at DESC LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(params![limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        Ok(records)
    }

    /// Atomically replace a record by id
    ///
    /// One UPDATE statement; the id and created_at are preserved. Returns
    /// `None` if the record does not exist.
    pub fn replace(conn: &Connection, id: i64, data: &RecordCreate) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            r#"
            UPDATE records
            SET kind = ?1,
                logged_at = COALESCE(?2, logged_at),
                title = ?3,
                kcal_low = ?4,
                kcal_mid = ?5,
                kcal_high = ?6,
                uncertainty = ?7,
                minutes = ?8,
                avg_hr = ?9,
                training_load = ?10,
                note = ?11,
                updated_at = datetime('now')
            WHERE id = ?12
            "#,
            params![
                data.kind.as_str(),
                data.logged_at,
                data.title,
                i64::from(data.range.low),
                i64::from(data.range.mid),
                i64::from(data.range.high),
                data.range.uncertainty,
                data.minutes,
                data.avg_hr,
                data.training_load,
                data.note,
                id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Delete a record
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM records WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Count records, optionally filtered by kind
    pub fn count(conn: &Connection, kind: Option<RecordKind>) -> DbResult<i64> {
        let count: i64 = if let Some(kind) = kind {
            conn.query_row(
                "SELECT COUNT(*) FROM records WHERE kind = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?
        };
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::estimate::bounded_range;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn meal(title: &str, kcal: f64) -> RecordCreate {
        RecordCreate {
            kind: RecordKind::Meal,
            logged_at: None,
            title: title.to_string(),
            range: bounded_range(kcal, 0.2),
            minutes: None,
            avg_hr: None,
            training_load: None,
            note: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = test_conn();
        let record = LogRecord::create(&conn, &meal("lunch", 650.0)).unwrap();
        assert_eq!(record.kind, RecordKind::Meal);
        assert_eq!(record.range.mid, 650);

        let fetched = LogRecord::get_by_id(&conn, record.id).unwrap().unwrap();
        assert_eq!(fetched.title, "lunch");
        assert_eq!(fetched.range, record.range);
    }

    #[test]
    fn test_get_missing_is_none() {
        let conn = test_conn();
        assert!(LogRecord::get_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_kind() {
        let conn = test_conn();
        LogRecord::create(&conn, &meal("breakfast", 300.0)).unwrap();
        let mut workout = meal("run", 400.0);
        workout.kind = RecordKind::Workout;
        workout.minutes = Some(35.0);
        LogRecord::create(&conn, &workout).unwrap();

        assert_eq!(LogRecord::list(&conn, None, 50, 0).unwrap().len(), 2);
        let meals = LogRecord::list(&conn, Some(RecordKind::Meal), 50, 0).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].title, "breakfast");
    }

    #[test]
    fn test_replace_is_in_place() {
        let conn = test_conn();
        let record = LogRecord::create(&conn, &meal("lunch", 650.0)).unwrap();

        let replaced = LogRecord::replace(&conn, record.id, &meal("lunch (corrected)", 500.0))
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, record.id);
        assert_eq!(replaced.title, "lunch (corrected)");
        assert_eq!(replaced.range.mid, 500);
        assert_eq!(replaced.created_at, record.created_at);
        // record count unchanged: replace, not delete-and-reinsert
        assert_eq!(LogRecord::count(&conn, None).unwrap(), 1);
    }

    #[test]
    fn test_replace_missing_is_none() {
        let conn = test_conn();
        assert!(LogRecord::replace(&conn, 42, &meal("x", 1.0)).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let record = LogRecord::create(&conn, &meal("snack", 150.0)).unwrap();
        assert!(LogRecord::delete(&conn, record.id).unwrap());
        assert!(!LogRecord::delete(&conn, record.id).unwrap());
        assert_eq!(LogRecord::count(&conn, None).unwrap(), 0);
    }
}
