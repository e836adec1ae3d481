use std::path::Path;

use ort::{inputs, session::builder::PrepackedWeights, session::Session, value::Value};
use tracing::debug;

use crate::document::classification::DocumentClassification;
use crate::document::pipeline::DocumentClassifier;
use crate::document::Document;
use crate::inference::error::InferenceError;
use crate::inference::session_pool::{self, SessionPool};
use crate::utils::image_utils;

/// Handwritten/printed classifier exported from a YOLO classification model.
///
/// The model takes a 224x224 centre crop scaled to `[0, 1]` and returns one
/// probability per class.
pub struct YoloClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: u32,
    min_confidence: f32,
}

impl YoloClassifier {
    const NUM_THREADS: usize = 4;

    pub fn new(
        model_path: &Path,
        prepacked: &PrepackedWeights,
        min_confidence: f32,
    ) -> Result<Self, InferenceError> {
        let session = session_pool::load_session(model_path, prepacked, Self::NUM_THREADS)?;
        let input_name = session_pool::first_input_name(&session)?;
        let output_name = session_pool::first_output_name(&session)?;

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size: 224,
            min_confidence,
        })
    }

    /// Loads `pool_size` sessions of the model.
    pub fn pool(
        model_path: &Path,
        pool_size: usize,
        min_confidence: f32,
    ) -> Result<SessionPool<Self>, InferenceError> {
        SessionPool::new(pool_size, |w| Self::new(model_path, w, min_confidence))
    }

    pub fn classify(
        &mut self,
        image: &image::RgbImage,
    ) -> Result<DocumentClassification, InferenceError> {
        let cropped = image_utils::resize_center_crop(image, self.input_size).map_err(|e| {
            InferenceError::PreprocessingError {
                operation: "crop image".to_string(),
                message: e.to_string(),
            }
        })?;

        let input_array =
            image_utils::subtract_mean_normalize(&cropped, &[0.0; 3], &[1.0 / 255.0; 3])
                .map_err(|e| InferenceError::PreprocessingError {
                    operation: "normalize image".to_string(),
                    message: e.to_string(),
                })?;

        let shape = input_array.shape().to_vec();
        let (data, _offset) = input_array.into_raw_vec_and_offset();
        let input_value = Value::from_array((shape.as_slice(), data)).map_err(|e| {
            InferenceError::PreprocessingError {
                operation: "create input value".to_string(),
                message: e.to_string(),
            }
        })?;

        let outputs = self
            .session
            .run(inputs![self.input_name.as_str() => input_value])
            .map_err(|source| InferenceError::ModelExecutionError {
                operation: "classifier forward pass".to_string(),
                source,
            })?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError::PredictionError {
                operation: "get model outputs".to_string(),
                message: format!("Output '{}' not found", self.output_name),
            })?
            .try_extract_tensor::<f32>()
            .map_err(|source| InferenceError::PredictionError {
                operation: "extract output tensor".to_string(),
                message: source.to_string(),
            })?;

        let Some((class_id, probability)) = image_utils::argmax(output.1) else {
            return Ok(DocumentClassification::Unknown);
        };

        debug!("Classifier top-1: class {} (p={:.3})", class_id, probability);

        if probability < self.min_confidence {
            return Ok(DocumentClassification::Unknown);
        }

        Ok(DocumentClassification::from_class_id(class_id))
    }
}

impl DocumentClassifier for SessionPool<YoloClassifier> {
    fn classify(&self, document: &Document) -> Result<DocumentClassification, InferenceError> {
        self.with(|model| model.classify(document.image()))
    }
}
