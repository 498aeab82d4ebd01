//! Runtime configuration
//!
//! Read once from the environment by the composition root.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub const ENV_NUTRITION_CSV: &str = "JALU_NUTRITION_CSV";
pub const ENV_DETECTOR_URL: &str = "JALU_DETECTOR_URL";
pub const ENV_DETECTOR_TIMEOUT_SECS: &str = "JALU_DETECTOR_TIMEOUT_SECS";
pub const ENV_MIN_CONFIDENCE: &str = "JALU_MIN_CONFIDENCE";
pub const ENV_OUTPUT_DIR: &str = "JALU_OUTPUT_DIR";

/// Detector confidence threshold (matches the usual YOLO default)
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_DETECTOR_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be between 0 and 1, got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Nutrition CSV; the built-in table is used when unset
    pub nutrition_csv: Option<PathBuf>,
    /// Object-detection endpoint; photo analysis is disabled when unset
    pub detector_url: Option<String>,
    #[serde(with = "duration_secs")]
    pub detector_timeout: Duration,
    pub min_confidence: f32,
    /// Annotated images, charts and reports are written here
    pub output_dir: PathBuf,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let detector_timeout = match non_empty(ENV_DETECTOR_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidNumber {
                    name: ENV_DETECTOR_TIMEOUT_SECS,
                    value: raw.clone(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_DETECTOR_TIMEOUT_SECS),
        };

        let min_confidence = match non_empty(ENV_MIN_CONFIDENCE) {
            Some(raw) => {
                let value: f32 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    name: ENV_MIN_CONFIDENCE,
                    value: raw.clone(),
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::OutOfRange {
                        name: ENV_MIN_CONFIDENCE,
                        value,
                    });
                }
                value
            }
            None => DEFAULT_MIN_CONFIDENCE,
        };

        Ok(Self {
            nutrition_csv: non_empty(ENV_NUTRITION_CSV).map(PathBuf::from),
            detector_url: non_empty(ENV_DETECTOR_URL).map(|u| u.trim().to_string()),
            detector_timeout,
            min_confidence,
            output_dir: non_empty(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(default_output_dir),
        })
    }
}

/// `<project root>/data/output`, where the project root is found by walking up
/// from target/release or target/debug
fn default_output_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("output");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.nutrition_csv.is_none());
        assert!(config.detector_url.is_none());
        assert_eq!(config.min_confidence, DEFAULT_MIN_CONFIDENCE);
        assert_eq!(config.detector_timeout, Duration::from_secs(30));
        assert!(config.output_dir.ends_with("data/output"));
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            (ENV_NUTRITION_CSV, "/srv/jalu/nutrition.csv"),
            (ENV_DETECTOR_URL, " http://localhost:8000/detect "),
            (ENV_DETECTOR_TIMEOUT_SECS, "5"),
            (ENV_MIN_CONFIDENCE, "0.5"),
            (ENV_OUTPUT_DIR, "/tmp/jalu"),
        ])
        .unwrap();
        assert_eq!(config.nutrition_csv, Some(PathBuf::from("/srv/jalu/nutrition.csv")));
        assert_eq!(config.detector_url.as_deref(), Some("http://localhost:8000/detect"));
        assert_eq!(config.detector_timeout, Duration::from_secs(5));
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/jalu"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[(ENV_DETECTOR_URL, "  "), (ENV_MIN_CONFIDENCE, "")]).unwrap();
        assert!(config.detector_url.is_none());
        assert_eq!(config.min_confidence, DEFAULT_MIN_CONFIDENCE);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[(ENV_MIN_CONFIDENCE, "high")]),
            Err(ConfigError::InvalidNumber { name: ENV_MIN_CONFIDENCE, .. })
        ));
        assert!(matches!(
            config_from(&[(ENV_MIN_CONFIDENCE, "1.5")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            config_from(&[(ENV_DETECTOR_TIMEOUT_SECS, "-1")]),
            Err(ConfigError::InvalidNumber { name: ENV_DETECTOR_TIMEOUT_SECS, .. })
        ));
    }
}
