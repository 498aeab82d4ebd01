//! Nutrition record model
//!
//! One row of the nutrition reference table.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// Per-unit nutrition for a named food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    /// Canonical food label (e.g. "Banana")
    pub label: String,
    /// Display-only portion description (e.g. "1 medium")
    pub quantity: String,
    #[serde(flatten)]
    pub nutrition: Nutrition,
}

impl NutritionRecord {
    pub fn new(
        label: impl Into<String>,
        quantity: impl Into<String>,
        protein: f64,
        carbs: f64,
        fat: f64,
        calories: f64,
    ) -> Self {
        Self {
            label: label.into(),
            quantity: quantity.into(),
            nutrition: Nutrition::new(protein, carbs, fat, calories),
        }
    }

    /// Lookup key: the lowercased label
    pub fn key(&self) -> String {
        self.label.to_lowercase()
    }
}
