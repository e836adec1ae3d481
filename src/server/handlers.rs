use axum::extract::{Multipart, State};
use axum::response::Json;

use super::error::{AppError, ValidationError};
use super::models::{DetectResponse, HealthResponse, UploadedFile};
use super::AppState;
use crate::document::Document;

const FILE_FIELD: &str = "file";

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Signature counting endpoint
pub async fn detect_signatures(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        "Received detection request for filename: {} ({} bytes)",
        upload.filename,
        upload.data.len()
    );

    upload.validate(state.max_file_size)?;
    let filename = upload.sanitized_filename();

    // Reject unsupported formats before touching the worker pool.
    Document::detect_type(&filename)?;

    let result = tokio::task::spawn_blocking(move || {
        process_upload(&state, &filename, &upload.data)
    })
    .await
    .map_err(|e| AppError::Internal(format!("processing task failed: {e}")))??;

    tracing::info!(
        "Detection completed: {} ({} signatures)",
        result.document_type,
        result.number_of_signatures
    );

    Ok(Json(result))
}

/// Runs one upload through the pipeline. Blocking.
///
/// The document's temporary file lives only for the duration of this call.
pub fn process_upload(
    state: &AppState,
    filename: &str,
    data: &[u8],
) -> Result<DetectResponse, AppError> {
    let mut document = Document::new_in(data, filename, state.temp_directory.as_deref())?;

    tracing::debug!("Document loaded with type: {:?}", document.doc_type());

    Ok(state.pipeline.process(&mut document)?)
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(ValidationError::from)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(ValidationError::from)?;

        return Ok(UploadedFile::new(filename, data.to_vec()));
    }

    Err(ValidationError::MissingFile.into())
}
