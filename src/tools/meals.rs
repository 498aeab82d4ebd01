//! Meal nutrition tools
//!
//! Estimate nutrition from detected labels or from a meal photo.

use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Serialize;

use crate::config::Config;
use crate::detection::{draw_detections, Detector, MealImage};
use crate::models::{filter_by_confidence, Detection, NutritionSummary};
use crate::nutrition::{aggregate, NutritionTable};

/// Shown when a meal produced no matched items
pub const NO_MATCH_TIP: &str =
    "Try objects such as: Banana, Apple, Sandwich, Pizza to test nutrition.";

/// Rounded presentation of a summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionDisplay {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    /// Matched items without repeats, first-seen order
    pub detected_items: Vec<String>,
    pub tip: Option<String>,
}

impl NutritionDisplay {
    pub fn from_summary(summary: &NutritionSummary) -> Self {
        let detected_items: Vec<String> = summary
            .distinct_items()
            .into_iter()
            .map(str::to_string)
            .collect();
        let tip = detected_items.is_empty().then(|| NO_MATCH_TIP.to_string());

        Self {
            calories: format!("{:.0} kcal", summary.total_calories()),
            protein: format!("{:.1} g", summary.total_protein()),
            carbs: format!("{:.1} g", summary.total_carbs()),
            fat: format!("{:.1} g", summary.total_fat()),
            detected_items,
            tip,
        }
    }
}

/// Response for estimate_nutrition
#[derive(Debug, Serialize)]
pub struct EstimateNutritionResponse {
    pub labels_received: usize,
    pub summary: NutritionSummary,
    pub display: NutritionDisplay,
}

/// Response for analyze_meal_photo
#[derive(Debug, Serialize)]
pub struct AnalyzeMealPhotoResponse {
    pub image_path: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Objects kept after the confidence threshold
    pub objects_detected: usize,
    pub objects_below_threshold: usize,
    pub min_confidence: f32,
    pub detections: Vec<Detection>,
    pub summary: NutritionSummary,
    pub display: NutritionDisplay,
    pub annotated_image_path: Option<String>,
    pub message: String,
}

/// Estimate nutrition for labels produced by an external detector
pub fn estimate_nutrition(table: &NutritionTable, labels: &[String]) -> EstimateNutritionResponse {
    let summary = aggregate(labels, table);
    let display = NutritionDisplay::from_summary(&summary);

    EstimateNutritionResponse {
        labels_received: labels.len(),
        summary,
        display,
    }
}

/// Timestamped file path inside the output directory
pub fn timestamped_output_path(output_dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("{}_{}.{}", prefix, stamp, extension))
}

/// Draw the detections onto the photo and write it as PNG
fn save_annotated_photo(rgb: &RgbImage, detections: &[Detection], path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let annotated = draw_detections(rgb, detections).map_err(|e| e.to_string())?;
    annotated.save(path).map_err(|e| e.to_string())?;
    tracing::info!("Saved annotated meal photo to {}", path.display());
    Ok(())
}

/// Detect food in a photo and estimate its nutrition
pub async fn analyze_meal_photo(
    table: &NutritionTable,
    detector: Option<&dyn Detector>,
    config: &Config,
    image_path: &str,
    annotated_output_path: Option<&str>,
    save_annotated: bool,
) -> Result<AnalyzeMealPhotoResponse, String> {
    let detector = detector.ok_or_else(|| crate::detection::DetectionError::NotConfigured.to_string())?;

    let source = PathBuf::from(image_path);
    let image = tokio::task::spawn_blocking(move || MealImage::open(&source))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    let all_detections = detector.detect(&image).await.map_err(|e| e.to_string())?;
    let total = all_detections.len();
    let detections = filter_by_confidence(all_detections, config.min_confidence);
    let objects_below_threshold = total - detections.len();

    let summary = aggregate(detections.iter().map(|d| d.label.as_str()), table);
    let display = NutritionDisplay::from_summary(&summary);
    let (image_width, image_height) = (image.width(), image.height());

    let annotated_image_path = if save_annotated {
        let path = match annotated_output_path {
            Some(p) => PathBuf::from(p),
            None => timestamped_output_path(&config.output_dir, "meal_detection", "png"),
        };
        let rgb = image.rgb;
        let boxes = detections.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || save_annotated_photo(&rgb, &boxes, &target))
            .await
            .map_err(|e| e.to_string())??;
        Some(path.display().to_string())
    } else {
        None
    };

    let message = if detections.is_empty() {
        "No food objects detected".to_string()
    } else {
        format!(
            "Found {} objects, {} matched the nutrition table",
            detections.len(),
            summary.matched_count()
        )
    };

    Ok(AnalyzeMealPhotoResponse {
        image_path: image_path.to_string(),
        image_width,
        image_height,
        objects_detected: detections.len(),
        objects_below_threshold,
        min_confidence: config.min_confidence,
        detections,
        summary,
        display,
        annotated_image_path,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionError;
    use async_trait::async_trait;
    use image::ImageFormat;

    struct FixedDetector(Vec<Detection>);

    #[async_trait]
    impl Detector for FixedDetector {
        async fn detect(&self, _image: &MealImage) -> Result<Vec<Detection>, DetectionError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    fn test_config(output_dir: PathBuf) -> Config {
        Config {
            nutrition_csv: None,
            detector_url: None,
            detector_timeout: std::time::Duration::from_secs(1),
            min_confidence: 0.25,
            output_dir,
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jalu-test-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_photo(dir: &Path) -> PathBuf {
        let path = dir.join("meal.png");
        RgbImage::from_pixel(64, 48, image::Rgb([240, 240, 240]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_display_rounds_for_presentation_only() {
        let table = NutritionTable::builtin();
        let labels = vec!["Banana".to_string(), "banana".to_string(), "Apple".to_string()];
        let response = estimate_nutrition(&table, &labels);

        assert_eq!(response.labels_received, 3);
        assert_eq!(response.display.calories, "305 kcal");
        assert_eq!(response.display.protein, "3.1 g");
        assert_eq!(response.display.carbs, "79.0 g");
        assert_eq!(response.display.fat, "0.9 g");
        assert_eq!(response.display.detected_items, vec!["Banana", "Apple"]);
        assert!(response.display.tip.is_none());
        assert_eq!(response.summary.matched_items.len(), 3);
    }

    #[test]
    fn test_tip_when_nothing_matched() {
        let table = NutritionTable::builtin();
        let response = estimate_nutrition(&table, &["person".to_string(), "fork".to_string()]);
        assert_eq!(response.display.calories, "0 kcal");
        assert_eq!(response.display.tip.as_deref(), Some(NO_MATCH_TIP));
        assert!(response.display.detected_items.is_empty());
    }

    #[tokio::test]
    async fn test_photo_analysis_without_detector() {
        let table = NutritionTable::builtin();
        let config = test_config(scratch_dir("nodetector"));
        let result = analyze_meal_photo(&table, None, &config, "meal.png", None, false).await;
        assert!(result.unwrap_err().contains("JALU_DETECTOR_URL"));
    }

    #[tokio::test]
    async fn test_photo_analysis_unreadable_image() {
        let table = NutritionTable::builtin();
        let config = test_config(scratch_dir("unreadable"));
        let detector = FixedDetector(Vec::new());
        let result = analyze_meal_photo(
            &table,
            Some(&detector),
            &config,
            "/nonexistent/jalu/meal.png",
            None,
            false,
        )
        .await;
        assert!(result.unwrap_err().starts_with("Failed to read image"));
    }

    #[tokio::test]
    async fn test_annotated_photo_creates_output_dir() {
        let dir = scratch_dir("nested");
        let photo = write_photo(&dir);
        let table = NutritionTable::builtin();
        let config = test_config(dir.join("out").join("photos"));
        let detector = FixedDetector(vec![Detection::new("apple", 0.7, [2.0, 2.0, 20.0, 20.0])]);

        let response = analyze_meal_photo(
            &table,
            Some(&detector),
            &config,
            photo.to_str().unwrap(),
            None,
            true,
        )
        .await
        .unwrap();

        let saved = PathBuf::from(response.annotated_image_path.unwrap());
        assert!(saved.starts_with(dir.join("out").join("photos")));
        assert_eq!(image::open(&saved).unwrap().width(), 64);
        assert_eq!(response.summary.matched_items, vec!["Apple"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_photo_analysis_filters_and_aggregates() {
        let dir = scratch_dir("analyze");
        let photo = write_photo(&dir);
        let table = NutritionTable::builtin();
        let config = test_config(dir.clone());
        let detector = FixedDetector(vec![
            Detection::new("banana", 0.91, [4.0, 4.0, 30.0, 30.0]),
            Detection::new("pizza", 0.80, [32.0, 8.0, 60.0, 40.0]),
            Detection::new("dining table", 0.60, [0.0, 0.0, 63.0, 47.0]),
            Detection::new("cake", 0.10, [10.0, 10.0, 20.0, 20.0]),
        ]);

        let annotated = dir.join("annotated.png");
        let response = analyze_meal_photo(
            &table,
            Some(&detector),
            &config,
            photo.to_str().unwrap(),
            annotated.to_str(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(response.objects_detected, 3);
        assert_eq!(response.objects_below_threshold, 1);
        assert_eq!(response.summary.matched_items, vec!["Banana", "Pizza"]);
        assert_eq!(response.summary.total_calories(), 105.0 + 285.0);
        assert_eq!((response.image_width, response.image_height), (64, 48));
        assert!(annotated.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
