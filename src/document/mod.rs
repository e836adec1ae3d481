pub mod bounds;
pub mod classification;
pub mod document_type;
pub mod error;
pub mod orientation;
pub mod pipeline;
pub mod result;
pub mod scored_box;

pub use bounds::BoundingBox;
pub use classification::DocumentClassification;
pub use document_type::DocumentType;
pub use error::DocumentError;
pub use orientation::{OrientationChain, OrientationOutcome, RotationAngle};
pub use pipeline::{DocumentClassifier, SignatureDetector, SignaturePipeline};
pub use result::DocumentResult;
pub use scored_box::ScoredBox;

use std::io::Write;
use std::path::Path;

use image::RgbImage;
use tempfile::NamedTempFile;

use crate::utils::image_utils;

/// A single uploaded page.
///
/// Uploads are written to a temporary file that is removed when the
/// document is dropped, whichever way the request ends. Rotations are
/// applied to both the decoded image and that file, so collaborators that
/// read from disk see the corrected page.
#[derive(Debug)]
pub struct Document {
    doc_type: DocumentType,
    image: RgbImage,
    file: Option<NamedTempFile>,
}

impl Document {
    /// Loads an upload into a temporary file in the system temp directory.
    pub fn new(bytes: &[u8], filename: &str) -> Result<Self, DocumentError> {
        Self::new_in(bytes, filename, None)
    }

    /// Loads an upload into a temporary file inside `temp_dir`.
    ///
    /// The extension of `filename` is checked before anything is written.
    pub fn new_in(
        bytes: &[u8],
        filename: &str,
        temp_dir: Option<&Path>,
    ) -> Result<Self, DocumentError> {
        let doc_type = Self::detect_type(filename)?;

        let suffix = format!(".{}", doc_type.canonical_extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload_").suffix(&suffix);

        let mut file = match temp_dir {
            Some(dir) => std::fs::create_dir_all(dir).and_then(|_| builder.tempfile_in(dir)),
            None => builder.tempfile(),
        }
        .map_err(|source| DocumentError::TempFileError { source })?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| DocumentError::TempFileError { source })?;

        let image = image::load_from_memory(bytes)
            .map_err(|source| DocumentError::ImageLoadError { source })?
            .to_rgb8();

        Ok(Self {
            doc_type,
            image,
            file: Some(file),
        })
    }

    /// Wraps an in-memory image with no backing file.
    #[must_use]
    pub fn from_image(image: RgbImage, doc_type: DocumentType) -> Self {
        Self {
            doc_type,
            image,
            file: None,
        }
    }

    /// Resolves the document type from a filename's extension.
    pub fn detect_type(filename: &str) -> Result<DocumentType, DocumentError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| DocumentError::UnsupportedFileType {
                extension: "(no extension)".to_string(),
            })?;

        DocumentType::from_extension(extension).ok_or_else(|| DocumentError::UnsupportedFileType {
            extension: extension.to_string(),
        })
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Path of the backing file, if the document has one.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Rotates the page and writes it back to the backing file.
    ///
    /// The in-memory image is only replaced once the file write succeeded,
    /// so both views stay in sync on failure.
    pub fn apply_rotation(&mut self, angle: RotationAngle) -> Result<(), DocumentError> {
        if angle.is_upright() {
            return Ok(());
        }

        let rotated = image_utils::rotate_image(&self.image, angle);

        if let Some(file) = &self.file {
            rotated
                .save_with_format(file.path(), self.doc_type.image_format())
                .map_err(|source| DocumentError::ImageSaveError { source })?;
        }

        self.image = rotated;
        Ok(())
    }
}
