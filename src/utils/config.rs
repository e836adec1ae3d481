//! Application configuration module.
//!
//! This module provides configuration management for the signature service.
//! Configuration is loaded from a JSON file; every field has a default so a
//! partial file is accepted.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/app_config.json";

/// Application configuration structure.
///
/// String fields use `Box<str>` since they are set once and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum allowed upload size in bytes
    pub max_file_size: u64,

    /// Directory path for model files
    pub model_directory: Box<str>,

    /// Host address for the server
    pub host_url: Box<str>,

    /// Directory for uploaded documents; the system temp dir when unset
    pub temp_directory: Option<Box<str>>,

    /// Number of sessions kept per model
    pub inference_pool_size: usize,

    /// Document type classifier, relative to `model_directory`
    pub classifier_model: Box<str>,

    /// Signature detector, relative to `model_directory`
    pub detector_model: Box<str>,

    /// Neural orientation classifier, relative to `model_directory`.
    /// `None` disables the neural orientation tier.
    pub orientation_model: Option<Box<str>>,

    /// Minimum detector score for a raw signature box
    pub detection_confidence: f32,

    /// IoU at or above which overlapping signature boxes are merged
    pub iou_threshold: f32,

    /// Top-1 probability below which the document type is `unknown`
    pub classifier_min_confidence: f32,

    /// Softmax confidence below which the neural orientation result is ignored
    pub neural_min_confidence: f32,

    /// Tesseract orientation detection settings
    pub osd: OsdConfig,
}

/// Settings for the OCR orientation tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsdConfig {
    pub enabled: bool,

    /// Tesseract executable name or path
    pub binary: Box<str>,

    /// Hard limit on a single tesseract run
    pub timeout_ms: u64,

    /// Orientation confidence (0-100) below which the reading is unreliable
    pub min_confidence: f32,
}

impl Default for OsdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "tesseract".into(),
            timeout_ms: 10_000,
            min_confidence: 10.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration JSON file
    ///
    /// # Returns
    ///
    /// Returns the parsed `AppConfig` or a `ConfigError` if loading or
    /// validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }

    /// Create a new configuration with default values.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            model_directory: "models".into(),
            host_url: "127.0.0.1:8000".into(),
            temp_directory: None,
            inference_pool_size: 2,
            classifier_model: "classificator.onnx".into(),
            detector_model: "signature.onnx".into(),
            orientation_model: Some("orientation.onnx".into()),
            detection_confidence: 0.25,
            iou_threshold: 0.7,
            classifier_min_confidence: 0.0,
            neural_min_confidence: 0.0,
            osd: OsdConfig::default(),
        }
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::Invalid {
                message: format!("iou_threshold must be in [0, 1], got {}", self.iou_threshold),
            });
        }
        if self.inference_pool_size == 0 {
            return Err(ConfigError::Invalid {
                message: "inference_pool_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to a model file within the model directory.
    ///
    /// # Arguments
    ///
    /// * `relative_path` - The relative path to the model file (e.g., "signature.onnx")
    #[must_use]
    pub fn model_path(&self, relative_path: &str) -> PathBuf {
        Path::new(&*self.model_directory).join(relative_path)
    }

    #[must_use]
    pub fn temp_directory(&self) -> Option<PathBuf> {
        self.temp_directory.as_deref().map(PathBuf::from)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
