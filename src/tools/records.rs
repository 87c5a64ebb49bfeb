//! Record store MCP Tools
//!
//! Read, replace, and delete operations over logged estimate records.

use serde::Serialize;

use crate::db::Database;
use crate::estimate::bounded_range;
use crate::models::{LogRecord, RecordCreate, RecordKind};

/// Summary of a record for list results
#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub id: i64,
    pub kind: RecordKind,
    pub logged_at: String,
    pub title: String,
    pub kcal_mid: u32,
    pub uncertainty: f64,
}

impl From<&LogRecord> for RecordSummary {
    fn from(record: &LogRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            logged_at: record.logged_at.clone(),
            title: record.title.clone(),
            kcal_mid: record.range.mid,
            uncertainty: record.range.uncertainty,
        }
    }
}

/// Response for list_records
#[derive(Debug, Serialize)]
pub struct ListRecordsResponse {
    pub records: Vec<RecordSummary>,
    pub total: i64,
}

/// Get a record by id
pub fn get_record(db: &Database, id: i64) -> Result<Option<LogRecord>, String> {
    db.with_conn(|conn| LogRecord::get_by_id(conn, id))
        .map_err(|e| e.to_string())
}

/// List records, newest first
pub fn list_records(
    db: &Database,
    kind: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListRecordsResponse, String> {
    let kind = match kind {
        Some(s) => Some(
            RecordKind::from_str(s)
                .ok_or_else(|| format!("Unknown kind '{}'; expected meal or workout", s))?,
        ),
        None => None,
    };

    db.with_conn(|conn| {
        let records = LogRecord::list(conn, kind, limit, offset)?;
        let total = LogRecord::count(conn, kind)?;
        Ok(ListRecordsResponse {
            records: records.iter().map(RecordSummary::from).collect(),
            total,
        })
    })
    .map_err(|e| e.to_string())
}

/// Atomically replace a record by id
///
/// The range is rebuilt from the supplied midpoint and uncertainty so the
/// stored low/high stay consistent with them.
pub fn replace_record(
    db: &Database,
    id: i64,
    kind: &str,
    title: String,
    kcal_mid: f64,
    uncertainty: f64,
    minutes: Option<f64>,
    avg_hr: Option<f64>,
    training_load: Option<f64>,
    note: Option<String>,
    logged_at: Option<String>,
) -> Result<Option<LogRecord>, String> {
    let kind = RecordKind::from_str(kind)
        .ok_or_else(|| format!("Unknown kind '{}'; expected meal or workout", kind))?;

    let data = RecordCreate {
        kind,
        logged_at,
        title,
        range: bounded_range(kcal_mid, uncertainty),
        minutes,
        avg_hr,
        training_load,
        note,
    };

    db.with_conn(|conn| LogRecord::replace(conn, id, &data))
        .map_err(|e| e.to_string())
}

/// Delete a record
/// Returns Ok(true) if deleted, Ok(false) if not found
pub fn delete_record(db: &Database, id: i64) -> Result<bool, String> {
    db.with_conn(|conn| LogRecord::delete(conn, id))
        .map_err(|e| e.to_string())
}
