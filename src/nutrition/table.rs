//! Nutrition reference table
//!
//! Read-only lookup from a detected label to its nutrition record. Built once by
//! the composition root and shared by reference afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::loader::{self, LoadError};
use crate::models::NutritionRecord;

/// Where the table's records came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TableSource {
    Builtin,
    Csv { path: PathBuf },
    Records,
}

impl std::fmt::Display for TableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSource::Builtin => write!(f, "built-in table"),
            TableSource::Csv { path } => write!(f, "csv {}", path.display()),
            TableSource::Records => write!(f, "in-memory records"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NutritionTable {
    records: Vec<NutritionRecord>,
    /// Lowercased label -> position in `records`
    index: HashMap<String, usize>,
    source: TableSource,
}

/// Reference values used when no CSV is configured
fn builtin_records() -> Vec<NutritionRecord> {
    vec![
        NutritionRecord::new("Banana", "1 medium", 1.3, 27.0, 0.3, 105.0),
        NutritionRecord::new("Apple", "1 medium", 0.5, 25.0, 0.3, 95.0),
        NutritionRecord::new("Orange", "1 medium", 1.2, 15.0, 0.2, 62.0),
        NutritionRecord::new("Broccoli", "100g", 2.8, 7.0, 0.4, 34.0),
        NutritionRecord::new("Carrot", "100g", 0.9, 10.0, 0.2, 41.0),
        NutritionRecord::new("Sandwich", "1 serving", 12.0, 30.0, 10.0, 250.0),
        NutritionRecord::new("Pizza", "1 slice", 11.0, 36.0, 12.0, 285.0),
        NutritionRecord::new("Cake", "1 slice", 3.0, 50.0, 15.0, 350.0),
        NutritionRecord::new("Bowl", "1 bowl", 5.0, 20.0, 2.0, 150.0),
        NutritionRecord::new("Milk", "1 bottle", 8.0, 12.0, 5.0, 120.0),
    ]
}

impl NutritionTable {
    /// The built-in reference table
    pub fn builtin() -> Self {
        let records = builtin_records();
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key(), i))
            .collect();
        Self {
            records,
            index,
            source: TableSource::Builtin,
        }
    }

    /// Build a table from an in-memory record list, validating every record
    pub fn from_records(records: Vec<NutritionRecord>) -> Result<Self, LoadError> {
        for (i, record) in records.iter().enumerate() {
            loader::validate_record(i + 1, record)?;
        }
        Self::build(records, TableSource::Records)
    }

    /// Load a table from a nutrition CSV file
    pub fn from_csv(path: &Path) -> Result<Self, LoadError> {
        let records = loader::load_csv(path)?;
        let table = Self::build(
            records,
            TableSource::Csv {
                path: path.to_path_buf(),
            },
        )?;
        tracing::info!("Loaded {} nutrition records from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load from CSV when a path is given, otherwise use the built-in table
    pub fn load(csv_path: Option<&Path>) -> Result<Self, LoadError> {
        match csv_path {
            Some(path) => Self::from_csv(path),
            None => Ok(Self::builtin()),
        }
    }

    fn build(records: Vec<NutritionRecord>, source: TableSource) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.key(), i).is_some() {
                return Err(LoadError::DuplicateLabel {
                    label: record.label.clone(),
                });
            }
        }
        Ok(Self {
            records,
            index,
            source,
        })
    }

    /// Case-insensitive exact lookup; no partial or synonym matching
    pub fn find(&self, label: &str) -> Option<&NutritionRecord> {
        self.index
            .get(&label.to_lowercase())
            .map(|&i| &self.records[i])
    }

    /// Records in load order
    pub fn records(&self) -> &[NutritionRecord] {
        &self.records
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }
}

impl Default for NutritionTable {
    fn default() -> Self {
        Self::builtin()
    }
}
