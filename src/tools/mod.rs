//! NutriGap Tools module
//!
//! MCP tool implementations and catalog import.

pub mod analysis;
pub mod import;
pub mod ingredients;
pub mod selection;
pub mod status;
