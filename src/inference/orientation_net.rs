use std::path::Path;

use image::{imageops, RgbImage};
use ndarray::Array4;
use ort::{inputs, session::builder::PrepackedWeights, session::Session, value::Value};

use crate::document::orientation::{NeuralPrediction, OrientationPredictor};
use crate::inference::error::InferenceError;
use crate::inference::session_pool::{self, SessionPool};
use crate::utils::image_utils;

/// Four-class document orientation classifier.
///
/// Classes are `0` upright, `1` turned clockwise, `2` upside down and `3`
/// turned counter-clockwise.
pub struct OrientationNet {
    session: Session,
    input_name: String,
    output_name: String,
    mean_values: [f32; 3],
    norm_values: [f32; 3],
    input_size: u32,
}

impl OrientationNet {
    const NUM_THREADS: usize = 4;
    const NUM_CLASSES: usize = 4;

    pub fn new(model_path: &Path, prepacked: &PrepackedWeights) -> Result<Self, InferenceError> {
        let session = session_pool::load_session(model_path, prepacked, Self::NUM_THREADS)?;
        let input_name = session_pool::first_input_name(&session)?;
        let output_name = session_pool::first_output_name(&session)?;

        Ok(Self {
            session,
            input_name,
            output_name,
            mean_values: [0.485 * 255.0, 0.456 * 255.0, 0.406 * 255.0],
            norm_values: [
                1.0 / 0.229 / 255.0,
                1.0 / 0.224 / 255.0,
                1.0 / 0.225 / 255.0,
            ],
            input_size: 224,
        })
    }

    /// Loads `pool_size` sessions of the model.
    pub fn pool(model_path: &Path, pool_size: usize) -> Result<SessionPool<Self>, InferenceError> {
        SessionPool::new(pool_size, |w| Self::new(model_path, w))
    }

    pub fn preprocess(&self, src: &RgbImage) -> Result<Array4<f32>, InferenceError> {
        let resized = imageops::resize(
            src,
            self.input_size,
            self.input_size,
            imageops::FilterType::Triangle,
        );

        image_utils::subtract_mean_normalize(&resized, &self.mean_values, &self.norm_values)
            .map_err(|e| InferenceError::PreprocessingError {
                operation: "normalize image".to_string(),
                message: e.to_string(),
            })
    }

    pub fn infer(&mut self, src: &RgbImage) -> Result<NeuralPrediction, InferenceError> {
        let input_array = self.preprocess(src)?;

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
                operation: "orientation forward pass".to_string(),
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

        let logits = output.1;
        if logits.len() < Self::NUM_CLASSES {
            return Err(InferenceError::PredictionError {
                operation: "read orientation scores".to_string(),
                message: format!(
                    "expected {} scores, got {}",
                    Self::NUM_CLASSES,
                    logits.len()
                ),
            });
        }

        let probabilities = image_utils::softmax(&logits[..Self::NUM_CLASSES]);
        let (class_index, confidence) =
            image_utils::argmax(&probabilities).ok_or_else(|| InferenceError::PredictionError {
                operation: "read orientation scores".to_string(),
                message: "all scores are NaN".to_string(),
            })?;

        Ok(NeuralPrediction {
            class_index,
            confidence: Some(confidence),
        })
    }
}

impl OrientationPredictor for SessionPool<OrientationNet> {
    fn predict(&self, image: &RgbImage) -> Result<NeuralPrediction, InferenceError> {
        if image.width() < 2 || image.height() < 2 {
            return Err(InferenceError::PreprocessingError {
                operation: "check image size".to_string(),
                message: format!("image too small ({}x{})", image.width(), image.height()),
            });
        }
        self.with(|net| net.infer(image))
    }
}
