//! NAL Tools module
//!
//! MCP tool implementations for the Nutrition & Activity Log.

pub mod estimates;
pub mod imports;
pub mod profile;
pub mod records;
pub mod status;
