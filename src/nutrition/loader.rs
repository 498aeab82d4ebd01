//! Nutrition table loading
//!
//! Parses the nutrition CSV and validates records before they reach the table.
//! Expected header: `FoodType,Quantity,Protein,Carbs,Fat,Calories` (any column order).

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::models::NutritionRecord;

/// Column names of the nutrition CSV
pub const COLUMNS: [&str; 6] = ["FoodType", "Quantity", "Protein", "Carbs", "Fat", "Calories"];

/// Nutrition table construction errors
///
/// `row` is the 1-based line number for CSV input and the 1-based position for
/// in-memory record lists.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read nutrition data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nutrition data is empty (missing header)")]
    EmptyInput,

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Column appears more than once: {0}")]
    DuplicateColumn(String),

    #[error("Unexpected column: '{0}'")]
    UnexpectedColumn(String),

    #[error("Row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: FoodType cannot be empty")]
    EmptyLabel { row: usize },

    #[error("Row {row}: FoodType '{label}' has leading or trailing whitespace")]
    PaddedLabel { row: usize, label: String },

    #[error("Row {row}: {column} value '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Row {row}: {column} cannot be negative ({value})")]
    NegativeValue {
        row: usize,
        column: &'static str,
        value: f64,
    },

    #[error("Duplicate food label: {label}")]
    DuplicateLabel { label: String },
}

/// Column positions resolved from the header line
struct ColumnIndex {
    food_type: usize,
    quantity: usize,
    protein: usize,
    carbs: usize,
    fat: usize,
    calories: usize,
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self, LoadError> {
        let names: Vec<String> = split_fields(header.trim_start_matches('\u{feff}'));

        let mut seen = HashSet::new();
        for name in &names {
            if !COLUMNS.contains(&name.as_str()) {
                return Err(LoadError::UnexpectedColumn(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(LoadError::DuplicateColumn(name.clone()));
            }
        }

        let position = |column: &'static str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or(LoadError::MissingColumn(column))
        };

        Ok(Self {
            food_type: position("FoodType")?,
            quantity: position("Quantity")?,
            protein: position("Protein")?,
            carbs: position("Carbs")?,
            fat: position("Fat")?,
            calories: position("Calories")?,
            width: names.len(),
        })
    }
}

/// Split a CSV line into trimmed fields.
///
/// A field starting with `"` runs to the closing quote and may contain commas;
/// `""` inside it is a literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());

    fields
}

/// Parse a non-negative, finite nutrient value
pub(crate) fn parse_amount(row: usize, column: &'static str, raw: &str) -> Result<f64, LoadError> {
    let value: f64 = raw.parse().map_err(|_| LoadError::InvalidNumber {
        row,
        column,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(LoadError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        });
    }
    if value < 0.0 {
        return Err(LoadError::NegativeValue { row, column, value });
    }

    Ok(value)
}

/// Check one in-memory record against the table schema
pub(crate) fn validate_record(row: usize, record: &NutritionRecord) -> Result<(), LoadError> {
    if record.label.trim().is_empty() {
        return Err(LoadError::EmptyLabel { row });
    }
    // Lookup keys are the lowercased label, so padding would make it unreachable
    if record.label.trim() != record.label {
        return Err(LoadError::PaddedLabel {
            row,
            label: record.label.clone(),
        });
    }

    let n = &record.nutrition;
    for (column, value) in [
        ("Protein", n.protein),
        ("Carbs", n.carbs),
        ("Fat", n.fat),
        ("Calories", n.calories),
    ] {
        if !value.is_finite() {
            return Err(LoadError::InvalidNumber {
                row,
                column,
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(LoadError::NegativeValue { row, column, value });
        }
    }

    Ok(())
}

/// Parse nutrition records from CSV text
///
/// Blank lines are skipped. Duplicate labels are left for the table to reject.
pub fn parse_csv<R: BufRead>(reader: R) -> Result<Vec<NutritionRecord>, LoadError> {
    let mut lines = reader.lines().enumerate();

    let columns = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                break ColumnIndex::from_header(&line)?;
            }
            None => return Err(LoadError::EmptyInput),
        }
    };

    let mut records = Vec::new();

    for (line_num, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line_num + 1;

        let fields = split_fields(&line);
        if fields.len() != columns.width {
            return Err(LoadError::FieldCount {
                row,
                expected: columns.width,
                found: fields.len(),
            });
        }

        let label = fields[columns.food_type].as_str();
        if label.is_empty() {
            return Err(LoadError::EmptyLabel { row });
        }

        records.push(NutritionRecord::new(
            label,
            fields[columns.quantity].as_str(),
            parse_amount(row, "Protein", &fields[columns.protein])?,
            parse_amount(row, "Carbs", &fields[columns.carbs])?,
            parse_amount(row, "Fat", &fields[columns.fat])?,
            parse_amount(row, "Calories", &fields[columns.calories])?,
        ));
    }

    Ok(records)
}

/// Read and parse a nutrition CSV file
pub fn load_csv(path: &Path) -> Result<Vec<NutritionRecord>, LoadError> {
    let file = File::open(path)?;
    parse_csv(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "FoodType,Quantity,Protein,Carbs,Fat,Calories
Banana,1 medium,1.3,27.0,0.3,105
Apple,1 medium,0.5,25.0,0.3,95
";

    #[test]
    fn test_parse_valid_csv() {
        let records = parse_csv(VALID.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], NutritionRecord::new("Banana", "1 medium", 1.3, 27.0, 0.3, 105.0));
        assert_eq!(records[1].label, "Apple");
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "Calories,FoodType,Fat,Carbs,Protein,Quantity\n95,Apple,0.3,25,0.5,1 medium\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0], NutritionRecord::new("Apple", "1 medium", 0.5, 25.0, 0.3, 95.0));
    }

    #[test]
    fn test_blank_lines_bom_and_quotes() {
        let csv = "\u{feff}FoodType,Quantity,Protein,Carbs,Fat,Calories\n\n\"Milk\",\"1 bottle\",8,12,5,120\n\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "Milk");
        assert_eq!(records[0].quantity, "1 bottle");
    }

    #[test]
    fn test_quoted_fields_with_commas_and_quotes() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\n\"Sandwich\",\"1 serving, ham\",12,30,10,250\n\"Cake\",\"1 \"\"party\"\" slice\",3,50,15,350\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], NutritionRecord::new("Sandwich", "1 serving, ham", 12.0, 30.0, 10.0, 250.0));
        assert_eq!(records[1].quantity, "1 \"party\" slice");
    }

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields(" a , \"b,c\" ,d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_fields("a,,"), vec!["a", "", ""]);
        assert_eq!(split_fields("5\" pie,x"), vec!["5\" pie", "x"]);
    }

    #[test]
    fn test_unexpected_column() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories,Fiber\nApple,1 medium,0.5,25,0.3,95,oops\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::UnexpectedColumn(c)) if c == "Fiber"
        ));
    }

    #[test]
    fn test_padded_label_rejected() {
        let record = NutritionRecord::new(" Banana", "1 medium", 1.3, 27.0, 0.3, 105.0);
        assert!(matches!(
            validate_record(4, &record),
            Err(LoadError::PaddedLabel { row: 4, label }) if label == " Banana"
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_csv("".as_bytes()), Err(LoadError::EmptyInput)));
        assert!(matches!(parse_csv("\n  \n".as_bytes()), Err(LoadError::EmptyInput)));
    }

    #[test]
    fn test_missing_column() {
        let csv = "FoodType,Quantity,Protein,Carbs,Calories\nApple,1,0.5,25,95\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::MissingColumn("Fat"))
        ));
    }

    #[test]
    fn test_duplicate_column() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories,Fat\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::DuplicateColumn(c)) if c == "Fat"
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\nApple,1 medium,0.5,25,0.3\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::FieldCount { row: 2, expected: 6, found: 5 })
        ));
    }

    #[test]
    fn test_empty_label() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\nApple,1,0.5,25,0.3,95\n ,1,1,1,1,1\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::EmptyLabel { row: 3 })
        ));
    }

    #[test]
    fn test_non_numeric_value() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\nApple,1 medium,lots,25,0.3,95\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::InvalidNumber { row: 2, column: "Protein", .. })
        ));
    }

    #[test]
    fn test_non_finite_value() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\nApple,1 medium,0.5,25,NaN,95\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::InvalidNumber { column: "Fat", .. })
        ));
    }

    #[test]
    fn test_negative_value() {
        let csv = "FoodType,Quantity,Protein,Carbs,Fat,Calories\nApple,1 medium,0.5,25,0.3,-95\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(LoadError::NegativeValue { row: 2, column: "Calories", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_csv(Path::new("/nonexistent/jalu/nutrition.csv"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
