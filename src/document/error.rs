use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("Failed to load image content")]
    ImageLoadError {
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save image content")]
    ImageSaveError {
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to persist uploaded document")]
    TempFileError {
        #[source]
        source: std::io::Error,
    },

    #[error("Model processing failed")]
    ModelProcessingError {
        #[from]
        source: crate::inference::InferenceError,
    },
}
