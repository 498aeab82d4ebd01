//! Object detection boundary
//!
//! Inference runs in an external service. This module reads meal photos, sends
//! them to the detector, and draws the returned boxes back onto the photo.

pub mod client;
pub mod overlay;

use std::path::Path;

use image::{ImageFormat, RgbImage};
use thiserror::Error;

pub use client::{parse_detections, Detector, HttpDetector};
pub use overlay::draw_detections;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0} (expected JPG or PNG)")]
    UnsupportedFormat(String),

    #[error("Detector request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Detector returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed detector response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Failed to draw detections: {0}")]
    Render(String),

    #[error("No object detector configured (set JALU_DETECTOR_URL)")]
    NotConfigured,
}

/// A decoded meal photo plus the original encoded bytes sent to the detector
#[derive(Debug, Clone)]
pub struct MealImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub rgb: RgbImage,
}

impl MealImage {
    /// Read a JPG or PNG file and decode it to RGB
    pub fn open(path: &Path) -> Result<Self, DetectionError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DetectionError> {
        let format = image::guess_format(&bytes)?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(DetectionError::UnsupportedFormat(format!("{:?}", format)));
        }
        let rgb = image::load_from_memory_with_format(&bytes, format)?.to_rgb8();
        Ok(Self { bytes, format, rgb })
    }

    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_png_is_accepted() {
        let img = RgbImage::from_pixel(8, 4, image::Rgb([10, 20, 30]));
        let meal = MealImage::from_bytes(encode(&img, ImageFormat::Png)).unwrap();
        assert_eq!(meal.content_type(), "image/png");
        assert_eq!((meal.width(), meal.height()), (8, 4));
        assert_eq!(meal.rgb.get_pixel(0, 0), &image::Rgb([10, 20, 30]));
    }

    #[test]
    fn test_bmp_is_rejected() {
        let img = RgbImage::new(2, 2);
        let result = MealImage::from_bytes(encode(&img, ImageFormat::Bmp));
        assert!(matches!(result, Err(DetectionError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = MealImage::from_bytes(b"not an image".to_vec());
        assert!(matches!(result, Err(DetectionError::Image(_))));
    }
}
