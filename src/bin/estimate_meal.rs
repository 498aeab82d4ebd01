//! Utility to estimate meal nutrition from detected labels
//!
//! Usage: estimate-meal banana banana apple

use jalu::config::Config;
use jalu::nutrition::NutritionTable;
use jalu::tools::meals;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<String> = std::env::args().skip(1).collect();
    if labels.is_empty() {
        eprintln!("Usage: estimate-meal <label> [<label> ...]");
        std::process::exit(2);
    }

    let config = Config::from_env()?;
    let table = NutritionTable::load(config.nutrition_csv.as_deref())?;
    eprintln!("Nutrition table: {} ({} records)", table.source(), table.len());

    let response = meals::estimate_nutrition(&table, &labels);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
