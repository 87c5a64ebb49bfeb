//! Nutrition & Activity Log (NAL) Library
//!
//! Core estimation engine and MCP server for calorie and activity logging.

pub mod build_info;
pub mod db;
pub mod estimate;
pub mod ingest;
pub mod mcp;
pub mod models;
pub mod tools;
