//! NutriGap Library
//!
//! Checks ingredient selections against minimum nutrient standards and
//! suggests ingredients that cover the gaps.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
