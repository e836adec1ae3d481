use serde::{Deserialize, Serialize};

use crate::document::classification::DocumentClassification;
use crate::document::scored_box::ScoredBox;

/// Final outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document_type: DocumentClassification,
    pub number_of_signatures: usize,
    /// Whether orientation correction changed the image.
    pub rotated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The unique signatures that were counted. Always present, empty for
    /// handwritten pages.
    #[serde(default)]
    pub signatures: Vec<ScoredBox>,
}

impl DocumentResult {
    pub const HANDWRITTEN_MESSAGE: &'static str = "Handwritten documents are not processed";

    /// Result for a handwritten document, which is never sent to the detector.
    #[must_use]
    pub fn handwritten(rotated: bool) -> Self {
        Self {
            document_type: DocumentClassification::Handwritten,
            number_of_signatures: 0,
            rotated,
            message: Some(Self::HANDWRITTEN_MESSAGE.to_string()),
            signatures: Vec::new(),
        }
    }

    /// Result carrying the deduplicated signatures.
    #[must_use]
    pub fn with_signatures(
        document_type: DocumentClassification,
        rotated: bool,
        signatures: Vec<ScoredBox>,
    ) -> Self {
        Self {
            document_type,
            number_of_signatures: signatures.len(),
            rotated,
            message: None,
            signatures,
        }
    }
}
