use serde::{Deserialize, Serialize};

use crate::document::bounds::BoundingBox;

/// A single raw detection: a box and the detector's confidence in it.
///
/// Confidences are expected in `[0, 1]` but are not validated; they only
/// influence ordering during deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBox {
    pub bounds: BoundingBox,
    pub confidence: f32,
}

impl ScoredBox {
    #[must_use]
    pub fn new(bounds: BoundingBox, confidence: f32) -> Self {
        Self { bounds, confidence }
    }
}
