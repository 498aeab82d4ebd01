//! Data models
//!
//! Plain data types shared by the nutrition core, detection and tools.

mod detection;
mod food_record;
mod nutrition;
mod summary;

pub use detection::{filter_by_confidence, Detection};
pub use food_record::NutritionRecord;
pub use nutrition::Nutrition;
pub use summary::NutritionSummary;
