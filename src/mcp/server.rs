//! NAL MCP Server Implementation
//!
//! Implements the MCP server with all NAL tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::estimate::{FoodTable, MacroSet};
use crate::tools::estimates;
use crate::tools::imports;
use crate::tools::profile;
use crate::tools::records;
use crate::tools::status::StatusTracker;

/// NAL MCP Service
#[derive(Clone)]
pub struct NalService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    food_table: Arc<FoodTable>,
    tool_router: ToolRouter<NalService>,
}

impl NalService {
    pub fn new(database_path: PathBuf, database: Database, food_table: Arc<FoodTable>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            food_table,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    /// Sex: male or female (selects the regression coefficient set)
    pub sex: String,
    /// Age in years
    pub age_years: f64,
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Resting heart rate in bpm (only needed for training-load scoring)
    pub hr_rest: Option<f64>,
    /// Maximum heart rate in bpm (only needed for training-load scoring)
    pub hr_max: Option<f64>,
    /// Calibration factor scaling all energy outputs; clamped to [0.7, 1.3]
    #[serde(default = "default_cal_factor")]
    pub cal_factor: f64,
}

fn default_cal_factor() -> f64 { 1.0 }

// ============================================================================
// Estimation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateFoodParams {
    /// Free-text food description (name plus any note, one string)
    pub text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Free-text food description to estimate and log
    pub text: String,
    /// Record title (defaults to the text itself)
    pub title: Option<String>,
    /// Independent second calorie estimate for the same meal (label, app);
    /// reconciled against the text estimate before storing
    pub second_opinion_kcal: Option<f64>,
    /// Optional notes
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateWorkoutParams {
    /// Average heart rate in bpm
    pub avg_hr: f64,
    /// Duration in minutes
    pub minutes: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWorkoutParams {
    /// Average heart rate in bpm
    pub avg_hr: f64,
    /// Duration in minutes
    pub minutes: f64,
    /// Record title
    pub title: Option<String>,
    /// Optional notes
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportHeartRateParams {
    /// Raw delimited text (CSV/TSV...); first row is the header. Delimiter
    /// and time/heart-rate columns are auto-detected.
    pub text: String,
    /// Store the resulting estimate as a workout record (default false)
    #[serde(default)]
    pub store: bool,
    /// Record title when storing
    pub title: Option<String>,
}

/// Macronutrient values for one side of a reconciliation
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MacroParams {
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

impl From<MacroParams> for MacroSet {
    fn from(p: MacroParams) -> Self {
        Self {
            protein_g: p.protein_g,
            carbs_g: p.carbs_g,
            fat_g: p.fat_g,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReconcileParams {
    /// Primary calorie estimate
    pub a_kcal: f64,
    /// Second independent calorie estimate
    pub b_kcal: f64,
    /// Uncertainty kept when the estimates agree (default 0.2)
    #[serde(default = "default_uncertainty")]
    pub base_uncertainty: f64,
    /// Macros of the primary estimate
    pub a_macros: Option<MacroParams>,
    /// Macros of the second estimate
    pub b_macros: Option<MacroParams>,
}

fn default_uncertainty() -> f64 { 0.2 }

// ============================================================================
// Record Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecordParams {
    /// Record ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecordsParams {
    /// Filter by kind: meal or workout (optional)
    pub kind: Option<String>,
    /// Maximum results (default 50)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReplaceRecordParams {
    /// Record ID to replace
    pub id: i64,
    /// Kind: meal or workout
    pub kind: String,
    /// New title
    pub title: String,
    /// New calorie midpoint; low/high are rebuilt from it
    pub kcal_mid: f64,
    /// New relative uncertainty (default 0.2)
    #[serde(default = "default_uncertainty")]
    pub uncertainty: f64,
    /// Workout minutes (workout records)
    pub minutes: Option<f64>,
    /// Average heart rate (workout records)
    pub avg_hr: Option<f64>,
    /// Training-load score (workout records)
    pub training_load: Option<f64>,
    /// New notes
    pub note: Option<String>,
    /// New logged-at timestamp (kept if omitted)
    pub logged_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecordParams {
    /// Record ID to delete
    pub id: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NalService {
    // --- Status ---

    #[tool(description = "Get the current status of the NAL service including build info, database status, and process information")]
    async fn nal_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for estimating and logging meals and workouts. Call this when starting a logging session or when unsure how to use the estimation tools.")]
    fn estimate_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ESTIMATE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ESTIMATE_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Get the stored estimator profile (sex, age, weight, heart rates, calibration factor)")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(p) => serde_json::to_string_pretty(&p),
            None => Ok(r#"{"error": "Profile not set", "hint": "call set_profile"}"#.to_string()),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Set or update the estimator profile. Workout estimation requires sex, age, and weight; resting/max heart rate enable the training-load score.")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::set_profile(&self.database, &p.sex, p.age_years, p.weight_kg, p.hr_rest, p.hr_max, p.cal_factor)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Food Estimation ---

    #[tool(description = "Estimate calories for a free-text food description (English or Chinese). Returns a bounded low/mid/high range with uncertainty, an explanation, and follow-up hints. Nothing is persisted.")]
    fn estimate_food(&self, Parameters(p): Parameters<EstimateFoodParams>) -> Result<CallToolResult, McpError> {
        let result = estimates::estimate_food(&self.food_table, &p.text);
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Estimate calories for a food description and store it as a meal record. Pass second_opinion_kcal to reconcile an independent estimate before storing.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let result = estimates::log_meal(&self.database, &self.food_table, &p.text, p.title, p.second_opinion_kcal, p.note)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Workout Estimation ---

    #[tool(description = "Estimate workout energy expenditure from an average heart rate and duration, using the stored profile. Includes the training-load score when the profile has resting/max heart rate. Nothing is persisted.")]
    fn estimate_workout(&self, Parameters(p): Parameters<EstimateWorkoutParams>) -> Result<CallToolResult, McpError> {
        let result = estimates::estimate_workout(&self.database, p.avg_hr, p.minutes)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Estimate a workout from average heart rate and duration and store it as a workout record")]
    fn log_workout(&self, Parameters(p): Parameters<LogWorkoutParams>) -> Result<CallToolResult, McpError> {
        let result = estimates::log_workout(&self.database, p.avg_hr, p.minutes, p.title, p.note)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Import a heart-rate time series from raw delimited text (CSV/TSV export already decoded to text). Auto-detects delimiter and columns, drops unparseable rows, excludes gaps over 10 minutes as sensor dropout, and returns the integrated estimate. Set store=true to save it as a workout record.")]
    fn import_heart_rate_series(&self, Parameters(p): Parameters<ImportHeartRateParams>) -> Result<CallToolResult, McpError> {
        let result = imports::import_heart_rate_text(&self.database, &p.text, p.store, p.title)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Reconciliation ---

    #[tool(description = "Reconcile two independent calorie estimates of the same event. Within 15% they average; beyond that the first (primary) is kept and the uncertainty is raised to reflect the disagreement.")]
    fn reconcile_estimates(&self, Parameters(p): Parameters<ReconcileParams>) -> Result<CallToolResult, McpError> {
        let result = estimates::reconcile(
            p.a_kcal,
            p.b_kcal,
            p.base_uncertainty,
            p.a_macros.map(MacroSet::from),
            p.b_macros.map(MacroSet::from),
        );
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Records ---

    #[tool(description = "Get a logged record by ID with full details")]
    fn get_record(&self, Parameters(p): Parameters<GetRecordParams>) -> Result<CallToolResult, McpError> {
        let result = records::get_record(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(record) => serde_json::to_string_pretty(&record),
            None => Ok(format!(r#"{{"error": "Record not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List logged records, newest first, optionally filtered by kind (meal or workout)")]
    fn list_records(&self, Parameters(p): Parameters<ListRecordsParams>) -> Result<CallToolResult, McpError> {
        let result = records::list_records(&self.database, p.kind.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Replace a record by ID in one atomic operation (the edit flow - never delete and recreate). The calorie range is rebuilt from kcal_mid and uncertainty.")]
    fn replace_record(&self, Parameters(p): Parameters<ReplaceRecordParams>) -> Result<CallToolResult, McpError> {
        let result = records::replace_record(
            &self.database, p.id, &p.kind, p.title, p.kcal_mid, p.uncertainty,
            p.minutes, p.avg_hr, p.training_load, p.note, p.logged_at,
        ).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(record) => serde_json::to_string_pretty(&record),
            None => Ok(format!(r#"{{"error": "Record not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a record by ID")]
    fn delete_record(&self, Parameters(p): Parameters<DeleteRecordParams>) -> Result<CallToolResult, McpError> {
        let deleted = records::delete_record(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NalService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nal".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutrition & Activity Log".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutrition & Activity Log (NAL) - calorie and activity logging with bounded estimates. \
                 IMPORTANT: Call estimate_instructions before a logging session. \
                 Profile: get_profile/set_profile (required for workout estimation). \
                 Food: estimate_food (pure), log_meal (persists; supports second_opinion_kcal reconciliation). \
                 Workouts: estimate_workout/log_workout from average heart rate, \
                 import_heart_rate_series for raw CSV/TSV text exports. \
                 Reconciliation: reconcile_estimates merges two independent estimates, \
                 raising uncertainty on disagreement instead of averaging it away. \
                 Records: get_record/list_records/replace_record/delete_record. \
                 Edits always go through replace_record (atomic replace-by-id)."
                    .into(),
            ),
        }
    }
}
