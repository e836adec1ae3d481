use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::document::classification::DocumentClassification;
use crate::document::error::DocumentError;
use crate::document::orientation::OrientationChain;
use crate::document::result::DocumentResult;
use crate::document::scored_box::ScoredBox;
use crate::document::Document;
use crate::inference::InferenceError;
use crate::utils::box_utils;

/// Decides whether a page is handwritten or printed.
pub trait DocumentClassifier: Send + Sync {
    fn classify(&self, document: &Document) -> Result<DocumentClassification, InferenceError>;
}

/// Finds signature candidates on a page. Output may contain several
/// overlapping boxes for the same signature.
pub trait SignatureDetector: Send + Sync {
    fn detect(&self, document: &Document) -> Result<Vec<ScoredBox>, InferenceError>;
}

/// Runs one document through orientation correction, classification and,
/// for printed pages, signature counting.
///
/// Collaborators are injected at construction and shared between requests;
/// the pipeline itself holds no per-document state.
#[derive(Clone)]
pub struct SignaturePipeline {
    orientation: OrientationChain,
    classifier: Arc<dyn DocumentClassifier>,
    detector: Arc<dyn SignatureDetector>,
    iou_threshold: f32,
}

impl SignaturePipeline {
    pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

    pub fn new(
        orientation: OrientationChain,
        classifier: Arc<dyn DocumentClassifier>,
        detector: Arc<dyn SignatureDetector>,
    ) -> Self {
        Self {
            orientation,
            classifier,
            detector,
            iou_threshold: Self::DEFAULT_IOU_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    /// Processes a document, rotating it in place.
    ///
    /// The detector is only called for documents that are not handwritten.
    /// Either a complete result is returned or the whole call fails.
    #[instrument(skip(self, document), fields(doc_type = ?document.doc_type()))]
    pub fn process(&self, document: &mut Document) -> Result<DocumentResult, DocumentError> {
        let orientation = self.orientation.correct_orientation(document);
        if orientation.rotated {
            info!("Image was rotated by {}", orientation.angle);
        }

        let classification = self.classifier.classify(document)?;
        info!("Document classified as {}", classification);

        if classification == DocumentClassification::Handwritten {
            return Ok(DocumentResult::handwritten(orientation.rotated));
        }

        let detections = self.detector.detect(document)?;
        let raw_count = detections.len();

        let signatures = box_utils::deduplicate(detections, self.iou_threshold);
        debug!(
            "Deduplicated {} raw detections into {} signatures (IoU threshold {})",
            raw_count,
            signatures.len(),
            self.iou_threshold
        );

        Ok(DocumentResult::with_signatures(
            classification,
            orientation.rotated,
            signatures,
        ))
    }
}
