//! Detection overlay
//!
//! Draws each detection as a red box with a "label confidence" caption above it.

use image::RgbImage;
use plotters::prelude::{Color, IntoDrawingArea, IntoFont, Rectangle, Text, RED};
use plotters_bitmap::BitMapBackend;

use super::DetectionError;
use crate::models::Detection;

const BOX_STROKE_WIDTH: u32 = 3;
const CAPTION_FONT_SIZE: u32 = 14;
/// Caption baseline offset above the box
const CAPTION_OFFSET: i32 = 10;

/// Convert a pixel bbox to integer corners inside the image.
///
/// Returns `None` for boxes that are empty after clamping.
pub fn clamp_bbox(bbox: &[f32; 4], width: u32, height: u32) -> Option<(i32, i32, i32, i32)> {
    if width == 0 || height == 0 || bbox.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;

    let x_min = (bbox[0].floor() as i32).clamp(0, max_x);
    let y_min = (bbox[1].floor() as i32).clamp(0, max_y);
    let x_max = (bbox[2].ceil() as i32).clamp(0, max_x);
    let y_max = (bbox[3].ceil() as i32).clamp(0, max_y);

    if x_min >= x_max || y_min >= y_max {
        return None;
    }
    Some((x_min, y_min, x_max, y_max))
}

/// Return a copy of `image` with the detections drawn on it
pub fn draw_detections(image: &RgbImage, detections: &[Detection]) -> Result<RgbImage, DetectionError> {
    let (width, height) = image.dimensions();
    let mut buffer = image.as_raw().clone();

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        let mut caption_failed = false;

        for detection in detections {
            let Some((x0, y0, x1, y1)) = clamp_bbox(&detection.bbox, width, height) else {
                continue;
            };

            root.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                RED.stroke_width(BOX_STROKE_WIDTH),
            ))
            .map_err(|e| DetectionError::Render(e.to_string()))?;

            if caption_failed {
                continue;
            }
            let caption = Text::new(
                detection.caption(),
                (x0, (y0 - CAPTION_OFFSET).max(0)),
                ("sans-serif", CAPTION_FONT_SIZE).into_font().color(&RED),
            );
            // Boxes are still useful when no font is available on the host
            if let Err(e) = root.draw(&caption) {
                tracing::warn!("Skipping detection captions: {}", e);
                caption_failed = true;
            }
        }

        root.present()
            .map_err(|e| DetectionError::Render(e.to_string()))?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| DetectionError::Render("Overlay buffer has the wrong size".to_string()))
}
