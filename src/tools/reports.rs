//! Meal report generation
//!
//! Macro-nutrient charts (PNG) and one-page meal reports (PDF) for a nutrition summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ::image::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;

use crate::models::{Nutrition, NutritionSummary};
use crate::nutrition::{aggregate, NutritionTable};
use crate::tools::meals::NutritionDisplay;

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (37, 99, 235); // Blue
const COLOR_PROTEIN: (u8, u8, u8) = (220, 38, 38); // Red
const COLOR_CARBS: (u8, u8, u8) = (234, 179, 8); // Amber
const COLOR_FAT: (u8, u8, u8) = (16, 185, 129); // Green
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

pub const DEFAULT_CHART_WIDTH: u32 = 800;
pub const DEFAULT_CHART_HEIGHT: u32 = 400;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RenderChartResponse {
    pub success: bool,
    pub file_path: String,
    pub width: u32,
    pub height: u32,
    pub summary: NutritionSummary,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub items_matched: usize,
    pub total_calories: f64,
    pub message: String,
}

/// Per-food contribution to a meal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBreakdown {
    pub food_type: String,
    pub count: usize,
    pub quantity: String,
    #[serde(flatten)]
    pub nutrition: Nutrition,
}

/// Group matched items by food, in first-seen order, with their summed nutrition
pub fn item_breakdown(summary: &NutritionSummary, table: &NutritionTable) -> Vec<ItemBreakdown> {
    summary
        .distinct_items()
        .into_iter()
        .filter_map(|item| {
            let record = table.find(item)?;
            let count = summary.matched_items.iter().filter(|m| m.as_str() == item).count();
            Some(ItemBreakdown {
                food_type: record.label.clone(),
                count,
                quantity: record.quantity.clone(),
                nutrition: record.nutrition.scale(count as f64),
            })
        })
        .collect()
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// Byte length of an RGB pixel buffer; computed in `usize` so large sizes do not wrap
fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Generate a protein/carbs/fat bar chart as PNG bytes
pub fn generate_macro_chart(summary: &NutritionSummary, width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if summary.is_empty() {
        return Err("No matched items to chart".to_string());
    }

    let bars = [
        ("Protein", summary.total_protein(), COLOR_PROTEIN),
        ("Carbs", summary.total_carbs(), COLOR_CARBS),
        ("Fat", summary.total_fat(), COLOR_FAT),
    ];
    let y_max = bars.iter().map(|b| b.1).fold(0.0, f64::max).max(1.0) * 1.2;

    let mut buffer = vec![0u8; rgb_buffer_len(width, height)];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Estimated macros - {:.0} kcal", summary.total_calories()),
                ("sans-serif", 22),
            )
            .margin(20)
            .x_label_area_size(10)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..bars.len() as f64, 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart.configure_mesh()
            .disable_x_mesh()
            .disable_x_axis()
            .y_desc("grams")
            .draw()
            .map_err(|e| e.to_string())?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, grams, (r, g, b)))| {
            let x = i as f64;
            Rectangle::new([(x + 0.15, 0.0), (x + 0.85, *grams)], RGBColor(*r, *g, *b).filled())
        })).map_err(|e| e.to_string())?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (name, grams, _))| {
            Text::new(
                format!("{} {:.1} g", name, grams),
                (i as f64 + 0.2, grams + y_max * 0.08),
                ("sans-serif", 16).into_font(),
            )
        })).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Aggregate labels and write the macro chart to `output_path`
pub fn render_macro_chart(
    table: &NutritionTable,
    labels: &[String],
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<RenderChartResponse, String> {
    let summary = aggregate(labels, table);
    let png = generate_macro_chart(&summary, width, height)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(output_path, png).map_err(|e| e.to_string())?;
    tracing::info!("Wrote macro chart to {}", output_path.display());

    Ok(RenderChartResponse {
        success: true,
        file_path: output_path.display().to_string(),
        width,
        height,
        summary,
    })
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(
    layer: &PdfLayerReference,
    x1: Mm,
    y1: Mm,
    x2: Mm,
    y2: Mm,
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![
            (Point::new(x1, y1), false),
            (Point::new(x2, y2), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

// ============================================================================
// Meal Report Generation
// ============================================================================

/// Generate a one-page PDF report for a meal
pub fn generate_meal_report(
    table: &NutritionTable,
    labels: &[String],
    output_path: &Path,
    title: Option<&str>,
    notes: Option<Vec<String>>,
) -> Result<GenerateReportResponse, String> {
    let summary = aggregate(labels, table);
    let display = NutritionDisplay::from_summary(&summary);
    let breakdown = item_breakdown(&summary, table);
    let title = title.unwrap_or("Meal Nutrition Report");

    let (doc, page1, layer1) = PdfDocument::new(
        title,
        Mm(215.9), // Letter width
        Mm(279.4), // Letter height
        "Layer 1",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);

    let page_height = 279.4;
    let margin_left = 15.0;
    let mut y = page_height - 20.0;

    add_text(&layer, &font_bold, title, Mm(margin_left), Mm(y), 18.0, COLOR_TITLE);
    y -= 10.0;

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Source: {}", table.source()), Mm(110.0), Mm(y), 11.0, COLOR_BLACK);
    y -= 6.0;

    add_text(
        &layer,
        &font,
        &format!("Labels received: {}  |  Matched: {}", labels.len(), summary.matched_count()),
        Mm(margin_left),
        Mm(y),
        11.0,
        COLOR_BLACK,
    );
    y -= 8.0;

    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Totals
    add_text(&layer, &font_bold, "Estimated Nutrition", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;
    add_text(&layer, &font, &format!("Calories: {}", display.calories), Mm(margin_left), Mm(y), 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Protein: {}", display.protein), Mm(80.0), Mm(y), 10.0, COLOR_PROTEIN);
    y -= 6.0;
    add_text(&layer, &font, &format!("Carbohydrates: {}", display.carbs), Mm(margin_left), Mm(y), 10.0, COLOR_CARBS);
    add_text(&layer, &font, &format!("Fat: {}", display.fat), Mm(80.0), Mm(y), 10.0, COLOR_FAT);
    y -= 12.0;

    // Item table
    add_text(&layer, &font_bold, "Detected Items", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    if breakdown.is_empty() {
        if let Some(tip) = &display.tip {
            add_text(&layer, &font, tip, Mm(margin_left), Mm(y), 10.0, COLOR_GRAY);
        }
        y -= 8.0;
    } else {
        let col_widths = [35.0, 12.0, 28.0, 22.0, 22.0, 22.0, 25.0];
        let headers = ["Food", "N", "Portion", "Protein", "Carbs", "Fat", "Calories"];

        let mut col_x = margin_left;
        for (i, header) in headers.iter().enumerate() {
            add_text(&layer, &font_bold, header, Mm(col_x), Mm(y), 9.0, COLOR_BLACK);
            col_x += col_widths[i];
        }
        y -= 5.0;

        for item in &breakdown {
            let values = [
                item.food_type.clone(),
                item.count.to_string(),
                item.quantity.clone(),
                format!("{:.1} g", item.nutrition.protein),
                format!("{:.1} g", item.nutrition.carbs),
                format!("{:.1} g", item.nutrition.fat),
                format!("{:.0} kcal", item.nutrition.calories),
            ];

            col_x = margin_left;
            for (i, value) in values.iter().enumerate() {
                add_text(&layer, &font, value, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
                col_x += col_widths[i];
            }
            y -= 4.5;
        }
        y -= 6.0;

        // 800x400 pixels at 120 DPI = ~169mm x 85mm
        match generate_macro_chart(&summary, DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT) {
            Ok(png_bytes) => {
                let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes)
                    .map_err(|e| e.to_string())?;
                let pdf_image = Image::from_dynamic_image(&dynamic_image);

                let transform = ImageTransform {
                    translate_x: Some(Mm(margin_left)),
                    translate_y: Some(Mm(y - 85.0)),
                    dpi: Some(120.0),
                    ..Default::default()
                };

                pdf_image.add_to_layer(layer.clone(), transform);
                y -= 92.0;
            }
            Err(e) => {
                add_text(&layer, &font, &format!("Chart generation error: {}", e), Mm(margin_left), Mm(y), 9.0, COLOR_PROTEIN);
                y -= 8.0;
            }
        }
    }

    if let Some(ref notes_list) = notes {
        if !notes_list.is_empty() {
            add_text(&layer, &font_bold, "Notes", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
            y -= 6.0;

            for note in notes_list {
                add_text(&layer, &font, &format!("- {}", note), Mm(margin_left), Mm(y), 9.0, COLOR_BLACK);
                y -= 5.0;
            }
        }
    }

    add_text(
        &layer,
        &font,
        "Estimates use fixed per-portion reference values and are not a dietary assessment.",
        Mm(margin_left),
        Mm(12.0),
        8.0,
        COLOR_GRAY,
    );

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(output_path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;
    tracing::info!("Wrote meal report to {}", output_path.display());

    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.display().to_string(),
        items_matched: summary.matched_count(),
        total_calories: summary.total_calories(),
        message: format!(
            "Meal report generated with {} matched items ({})",
            summary.matched_count(),
            display.calories
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_item_breakdown_groups_repeats() {
        let table = NutritionTable::builtin();
        let summary = aggregate(["pizza", "Banana", "PIZZA", "car", "pizza"], &table);
        let breakdown = item_breakdown(&summary, &table);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].food_type, "Pizza");
        assert_eq!(breakdown[0].count, 3);
        assert_eq!(breakdown[0].nutrition.calories, 855.0);
        assert_eq!(breakdown[1].food_type, "Banana");
        assert_eq!(breakdown[1].count, 1);

        let total: Nutrition = breakdown.iter().map(|b| b.nutrition).sum();
        assert_eq!(total.calories, summary.total_calories());
    }

    #[test]
    fn test_rgb_buffer_len_does_not_wrap() {
        assert_eq!(rgb_buffer_len(800, 400), 960_000);
        assert_eq!(rgb_buffer_len(40_000, 40_000), 4_800_000_000);
    }

    #[test]
    fn test_chart_requires_matched_items() {
        let result = generate_macro_chart(&NutritionSummary::empty(), 200, 100);
        assert!(result.is_err());
    }

    #[test]
    fn test_meal_report_is_written() {
        let dir = std::env::temp_dir().join(format!("jalu-report-{}", std::process::id()));
        let path = dir.join("meal.pdf");
        let table = NutritionTable::builtin();

        let response = generate_meal_report(
            &table,
            &labels(&["banana", "milk", "person"]),
            &path,
            None,
            Some(vec!["School lunch, class 3B".to_string()]),
        )
        .unwrap();

        assert!(response.success);
        assert_eq!(response.items_matched, 2);
        assert_eq!(response.total_calories, 225.0);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_meal_report_without_matches() {
        let dir = std::env::temp_dir().join(format!("jalu-report-empty-{}", std::process::id()));
        let path = dir.join("empty.pdf");

        let response = generate_meal_report(
            &NutritionTable::builtin(),
            &labels(&["person"]),
            &path,
            Some("Empty Tray"),
            None,
        )
        .unwrap();

        assert_eq!(response.items_matched, 0);
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
