//! MCP protocol surface

mod server;

pub use server::NutriGapService;
