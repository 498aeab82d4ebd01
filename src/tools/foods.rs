//! Nutrition table tools
//!
//! Read-only views of the loaded nutrition table.

use serde::Serialize;

use crate::models::NutritionRecord;
use crate::nutrition::{NutritionTable, TableSource};

/// One table row as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct FoodSummary {
    pub food_type: String,
    pub quantity: String,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

impl From<&NutritionRecord> for FoodSummary {
    fn from(record: &NutritionRecord) -> Self {
        Self {
            food_type: record.label.clone(),
            quantity: record.quantity.clone(),
            protein: record.nutrition.protein,
            carbs: record.nutrition.carbs,
            fat: record.nutrition.fat,
            calories: record.nutrition.calories,
        }
    }
}

/// Response for list_foods
#[derive(Debug, Serialize)]
pub struct ListFoodsResponse {
    pub source: TableSource,
    pub items: Vec<FoodSummary>,
    pub total: usize,
}

/// Response for lookup_food
#[derive(Debug, Serialize)]
pub struct LookupFoodResponse {
    pub query: String,
    pub food: FoodSummary,
}

/// List every food in table order
pub fn list_foods(table: &NutritionTable) -> ListFoodsResponse {
    let items: Vec<FoodSummary> = table.records().iter().map(FoodSummary::from).collect();
    let total = items.len();

    ListFoodsResponse {
        source: table.source().clone(),
        items,
        total,
    }
}

/// Look up one label; `None` when the table has no entry for it
pub fn lookup_food(table: &NutritionTable, label: &str) -> Option<LookupFoodResponse> {
    table.find(label).map(|record| LookupFoodResponse {
        query: label.to_string(),
        food: FoodSummary::from(record),
    })
}
