use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// JPEG image file (`.jpg`, `.jpeg`).
    Jpeg,
    /// PNG image file (`.png`).
    Png,
    /// Bitmap image file (`.bmp`).
    Bmp,
    /// TIFF image file (`.tiff`).
    Tiff,
}

impl DocumentType {
    /// Creates a `DocumentType` from a file extension string.
    ///
    /// # Arguments
    ///
    /// * `ext` - The file extension without the leading dot, in any case.
    ///
    /// # Returns
    ///
    /// `Some(DocumentType)` if the extension is recognized, `None` otherwise.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::supported_types()
            .into_iter()
            .find(|(supported_ext, _)| supported_ext.eq_ignore_ascii_case(ext))
            .map(|(_, doc_type)| doc_type)
    }

    /// All accepted extensions with their document types.
    #[must_use]
    pub fn supported_types() -> Vec<(&'static str, DocumentType)> {
        vec![
            ("jpg", DocumentType::Jpeg),
            ("jpeg", DocumentType::Jpeg),
            ("png", DocumentType::Png),
            ("bmp", DocumentType::Bmp),
            ("tiff", DocumentType::Tiff),
        ]
    }

    /// The extension used for files written by this crate.
    #[must_use]
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            DocumentType::Jpeg => "jpg",
            DocumentType::Png => "png",
            DocumentType::Bmp => "bmp",
            DocumentType::Tiff => "tiff",
        }
    }

    #[must_use]
    pub fn image_format(&self) -> ImageFormat {
        match self {
            DocumentType::Jpeg => ImageFormat::Jpeg,
            DocumentType::Png => ImageFormat::Png,
            DocumentType::Bmp => ImageFormat::Bmp,
            DocumentType::Tiff => ImageFormat::Tiff,
        }
    }
}
