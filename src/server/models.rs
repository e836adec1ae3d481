use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::document::DocumentResult;

const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\\', '\0'];

/// Response body of `POST /detect-signatures`.
pub type DetectResponse = DocumentResult;

/// A file received in the `file` field of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Checks the filename and size. The extension itself is checked when
    /// the document is built.
    pub fn validate(&self, max_file_size: usize) -> Result<(), ValidationError> {
        self.validate_filename()?;

        if self.data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        if self.data.len() > max_file_size {
            return Err(ValidationError::FileSizeTooLarge {
                size: self.data.len(),
                limit: max_file_size,
            });
        }

        Ok(())
    }

    fn validate_filename(&self) -> Result<(), ValidationError> {
        let filename = self.filename.trim();

        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }

        if filename.len() > 255 {
            return Err(ValidationError::FilenameTooLong);
        }

        if let Some(ch) = filename
            .chars()
            .find(|ch| FORBIDDEN_FILENAME_CHARS.contains(ch))
        {
            return Err(ValidationError::ForbiddenCharacter(ch));
        }

        if !filename.contains('.') || filename.ends_with('.') {
            return Err(ValidationError::MissingExtension);
        }

        if filename.starts_with('.') {
            return Err(ValidationError::InvalidFilenameEdges);
        }

        Ok(())
    }

    pub fn sanitized_filename(&self) -> String {
        self.filename.trim().to_string()
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
