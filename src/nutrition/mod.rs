//! Nutrition core
//!
//! Reference table, CSV loading and label aggregation.

pub mod aggregator;
pub mod loader;
pub mod table;

pub use aggregator::aggregate;
pub use loader::{load_csv, parse_csv, LoadError};
pub use table::{NutritionTable, TableSource};
