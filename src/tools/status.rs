//! NAL Status Tool
//!
//! Provides runtime status information about the NAL service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Estimation instructions for AI assistants
pub const ESTIMATE_INSTRUCTIONS: &str = r#"
# NAL Estimation Instructions

This guide explains how to log meals and workouts with the Nutrition &
Activity Log (NAL) tools. NAL is a conservative-range estimator: every
calorie value comes back as a low/mid/high range with an explicit
uncertainty, never as a falsely precise single number.

---

## Before anything else: the profile

Workout estimation needs sex, age, and weight. Call `get_profile`; if it is
empty, ask the user and call `set_profile`. Resting and max heart rate are
only needed for the training-load score - leave them out if unknown.

The `cal_factor` field linearly scales all energy-expenditure outputs
(range 0.7-1.3). Only change it when the user has compared NAL's numbers
against a trusted device over several workouts.

---

## Logging meals

1. Pass the user's own words to `estimate_food` - the food name plus any
   free-form note, in one string. Both English and Chinese work
   ("米饭150g 炸鸡", "2 eggs and toast").
2. If the user already states calories ("200 kcal", "350大卡"), NAL uses
   that number directly and never second-guesses it.
3. Read the `followups` array: it names the matched foods that fell back
   to a default portion, oils and sauces first. Relay at most one or two
   of these questions; do not interrogate the user.
4. When the user confirms, call `log_meal` to persist the estimate.
5. If the user has a second estimate for the same meal (a package label, a
   restaurant app), pass it as `second_opinion_kcal` - NAL reconciles the
   two, raising the stored uncertainty when they disagree instead of
   averaging away the disagreement.

An `ok: false` response means the text had no usable signal. Ask the user
for a food name, a weight, or a calorie guess - it is not an error.

## Logging workouts

- With an average heart rate and a duration: `estimate_workout`, then
  `log_workout` to persist.
- With a heart-rate file export: pass the decoded text to
  `import_heart_rate_series`. The delimiter and the time/heart-rate
  columns are auto-detected; rows that fail to parse are dropped and
  counted in the response. Gaps above 10 minutes are treated as sensor
  dropout and excluded, so the integrated minutes can be less than the
  wall-clock span.

## Editing

`replace_record` replaces a record by id in one atomic operation. Never
delete-and-recreate to edit.
"#;

/// Current status of the NAL service
#[derive(Debug, Serialize)]
pub struct NalStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service status from startup
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NalStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NalStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
