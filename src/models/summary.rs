//! Nutrition summary model
//!
//! Result of aggregating detected labels against the nutrition table.

use serde::Serialize;

use super::Nutrition;

/// Aggregated nutrient totals for one meal
///
/// Created fresh for every aggregation and owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    #[serde(flatten)]
    pub totals: Nutrition,
    /// Canonical labels of every matched detection, duplicates included
    pub matched_items: Vec<String>,
}

impl NutritionSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_protein(&self) -> f64 {
        self.totals.protein
    }

    pub fn total_carbs(&self) -> f64 {
        self.totals.carbs
    }

    pub fn total_fat(&self) -> f64 {
        self.totals.fat
    }

    pub fn total_calories(&self) -> f64 {
        self.totals.calories
    }

    pub fn matched_count(&self) -> usize {
        self.matched_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched_items.is_empty()
    }

    /// Matched items without repeats, in first-seen order
    pub fn distinct_items(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.matched_items
            .iter()
            .map(String::as_str)
            .filter(|item| seen.insert(*item))
            .collect()
    }
}
