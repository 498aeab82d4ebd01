//! JALU Tools module
//!
//! MCP tool implementations for meal nutrition estimation.

pub mod foods;
pub mod meals;
pub mod program;
pub mod reports;
pub mod status;
