//! Object detector client
//!
//! The detector receives the encoded image as the request body and answers with
//! `{"detections": [{"label": "...", "confidence": 0.9, "bbox": [x1, y1, x2, y2]}]}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::{DetectionError, MealImage};
use crate::models::Detection;

/// Anything that can turn a meal photo into labelled boxes
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, image: &MealImage) -> Result<Vec<Detection>, DetectionError>;

    /// Human-readable description for status output
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Parse a detector response body
pub fn parse_detections(body: &str) -> Result<Vec<Detection>, DetectionError> {
    let response: DetectionResponse = serde_json::from_str(body)?;
    Ok(response.detections)
}

/// Detector reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: reqwest::Client,
    url: String,
}

impl HttpDetector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DetectionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(&self, image: &MealImage) -> Result<Vec<Detection>, DetectionError> {
        tracing::debug!(
            "Sending {} byte {} image to detector at {}",
            image.bytes.len(),
            image.content_type(),
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, image.content_type())
            .body(image.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Detector at {} returned HTTP {}", self.url, status.as_u16());
            return Err(DetectionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let detections = parse_detections(&body)?;
        tracing::info!("Detector returned {} objects", detections.len());
        Ok(detections)
    }

    fn describe(&self) -> String {
        format!("http {}", self.url)
    }
}
