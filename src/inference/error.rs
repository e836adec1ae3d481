use std::path::PathBuf;
use std::time::Duration;

use ort::Error as OrtError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("ONNX Runtime error: {source}")]
    Ort {
        #[from]
        source: OrtError,
    },

    #[error("Model file not found: {path}")]
    ModelUnavailable { path: PathBuf },

    #[error("Failed to load model file: {path}")]
    ModelFileLoadError {
        path: PathBuf,
        #[source]
        source: OrtError,
    },

    #[error("Model execution failed: {operation}")]
    ModelExecutionError {
        operation: String,
        #[source]
        source: OrtError,
    },

    #[error("Image preprocessing failed: {operation}")]
    PreprocessingError { operation: String, message: String },

    #[error("Prediction processing failed: {operation}")]
    PredictionError { operation: String, message: String },

    #[error("Failed to run {program}")]
    ProcessError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}
