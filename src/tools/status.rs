//! JALU Status Tool
//!
//! Runtime status information about the JALU service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::nutrition::TableSource;

/// Usage guide for AI assistants
pub const NUTRITION_INSTRUCTIONS: &str = r#"
# JALU Meal Nutrition Instructions

JALU estimates the nutrition of a meal from the food objects detected in it.

## From a photo

Call `analyze_meal_photo` with the path of a JPG or PNG file. The image is sent
to the configured object detector; detections below the confidence threshold
are dropped and the rest are matched against the nutrition table. An annotated
copy of the photo with the detection boxes is saved unless `save_annotated` is
false.

## From labels

If detection already happened elsewhere, call `estimate_nutrition` with the
detected labels. Repeat a label once per detected object: three bananas are
`["banana", "banana", "banana"]`.

## Matching rules

- Matching is exact and case-insensitive (`"APPLE"` == `"apple"`).
- Labels with no table entry (e.g. "person", "fork") are ignored.
- There is no partial or synonym matching: "sandwiches" does not match
  "Sandwich".
- Use `list_foods` to see the table, `lookup_food` to check a single label.

## Output

Totals are exact sums of per-portion reference values. The `display` block
rounds calories to whole kcal and macros to 0.1 g for presentation.
`render_macro_chart` writes a PNG bar chart; `generate_meal_report` writes a
one-page PDF.
"#;

/// Runtime status of the JALU service
#[derive(Debug, Clone, Serialize)]
pub struct JaluStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub nutrition_table: TableSource,
    pub nutrition_records: usize,
    pub detector: Option<String>,
    pub min_confidence: f32,
    pub output_dir: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for the JALU service
pub struct StatusTracker {
    start_time: Instant,
    table_source: TableSource,
    table_size: usize,
    detector: Option<String>,
    min_confidence: f32,
    output_dir: String,
}

impl StatusTracker {
    pub fn new(
        table_source: TableSource,
        table_size: usize,
        detector: Option<String>,
        min_confidence: f32,
        output_dir: String,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            table_source,
            table_size,
            detector,
            min_confidence,
            output_dir,
        }
    }

    pub fn get_status(&self) -> JaluStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        JaluStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            nutrition_table: self.table_source.clone(),
            nutrition_records: self.table_size,
            detector: self.detector.clone(),
            min_confidence: self.min_confidence,
            output_dir: self.output_dir.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
