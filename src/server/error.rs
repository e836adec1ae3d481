use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::document::DocumentError;

/// Problems with the upload itself, detected before any processing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file was uploaded in field 'file'")]
    MissingFile,

    #[error("Filename is empty")]
    EmptyFilename,

    #[error("Filename exceeds 255 characters")]
    FilenameTooLong,

    #[error("Filename contains forbidden character {0:?}")]
    ForbiddenCharacter(char),

    #[error("Filename has no extension")]
    MissingExtension,

    #[error("Filename starts or ends with an invalid character")]
    InvalidFilenameEdges,

    #[error("File is empty")]
    EmptyFile,

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileSizeTooLarge { size: usize, limit: usize },

    #[error("Malformed multipart body: {message}")]
    Multipart { status: StatusCode, message: String },
}

impl From<MultipartError> for ValidationError {
    fn from(err: MultipartError) -> Self {
        ValidationError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid upload")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("Document processing error")]
    Document {
        #[from]
        source: DocumentError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation {
                source: ValidationError::FileSizeTooLarge { .. },
            } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation {
                source: ValidationError::Multipart { status, .. },
            } if *status == StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Document {
                source: DocumentError::UnsupportedFileType { .. },
            } => StatusCode::BAD_REQUEST,
            AppError::Document { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_message, details) = match self {
            AppError::Validation { source } if status == StatusCode::PAYLOAD_TOO_LARGE => {
                ("Payload Too Large".to_string(), Some(source.to_string()))
            }
            AppError::Validation { source } => {
                ("Bad Request".to_string(), Some(source.to_string()))
            }
            AppError::Document {
                source: source @ DocumentError::UnsupportedFileType { .. },
            } => ("Unsupported Format".to_string(), Some(source.to_string())),
            AppError::Document { source } => {
                tracing::error!("Document processing failed: {:?}", source);
                ("Document Processing Error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal Server Error".to_string(), None)
            }
        };

        let mut error_response = ErrorResponse::new(error_message);
        if let Some(details) = details {
            error_response = error_response.with_details(details);
        }

        (status, Json(error_response)).into_response()
    }
}
