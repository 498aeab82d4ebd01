//! Detection-to-nutrition aggregation

use super::NutritionTable;
use crate::models::NutritionSummary;

/// Sum the nutrition of every label found in the table.
///
/// Labels are matched case-insensitively. A label with no table entry is
/// skipped without side effects. Repeated labels contribute once per
/// occurrence, both to the totals and to `matched_items`.
pub fn aggregate<I, S>(labels: I, table: &NutritionTable) -> NutritionSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut summary = NutritionSummary::empty();

    for label in labels {
        if let Some(record) = table.find(label.as_ref()) {
            summary.totals += record.nutrition;
            summary.matched_items.push(record.label.clone());
        }
    }

    summary
}
