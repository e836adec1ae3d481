//! Page orientation correction.
//!
//! [`OrientationChain`] picks a correction from three sources in order of
//! trust and stops at the first one that gives a usable answer:
//!
//! 1. **Neural** - a four-class orientation classifier. Any error, an
//!    unknown class or an unusable confidence moves on to the next tier.
//! 2. **OSD** - the OCR engine's orientation and script detection. A missing
//!    angle, a confidence of zero, or a confidence below the low-confidence
//!    threshold moves on to the next tier.
//! 3. **Dimensions** - landscape pages are turned clockwise, anything else is
//!    left alone. This tier cannot fail, so the chain always terminates.
//!
//! No tier is retried.

mod angle;
mod signal;

pub use angle::RotationAngle;
pub use signal::{
    accept_neural, dimension_heuristic, evaluate_osd, neural_signal, osd_signal,
    NeuralPrediction, OrientationSignal, OsdReading, OsdVerdict,
};

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, error, info, instrument, warn};

use crate::document::Document;
use crate::inference::InferenceError;

/// Neural orientation classifier collaborator.
pub trait OrientationPredictor: Send + Sync {
    fn predict(&self, image: &RgbImage) -> Result<NeuralPrediction, InferenceError>;
}

/// OCR orientation detection collaborator. Receives the whole document so
/// implementations can work from its backing file.
pub trait OrientationScanner: Send + Sync {
    fn scan(&self, document: &Document) -> Result<OsdReading, InferenceError>;
}

/// The tier that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationTier {
    Neural,
    Osd,
    Dimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationDecision {
    pub angle: RotationAngle,
    pub tier: OrientationTier,
}

/// Result of [`OrientationChain::correct_orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationOutcome {
    pub angle: RotationAngle,
    pub tier: OrientationTier,
    /// Whether the document's image was actually changed.
    pub rotated: bool,
}

#[derive(Clone)]
pub struct OrientationChain {
    predictor: Option<Arc<dyn OrientationPredictor>>,
    scanner: Option<Arc<dyn OrientationScanner>>,
    neural_min_confidence: f32,
    osd_min_confidence: f32,
}

impl Default for OrientationChain {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationChain {
    /// OSD confidence (0-100 scale) below which a reading is unreliable.
    pub const DEFAULT_OSD_MIN_CONFIDENCE: f32 = 10.0;

    /// Creates a chain with only the dimension heuristic enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            predictor: None,
            scanner: None,
            neural_min_confidence: 0.0,
            osd_min_confidence: Self::DEFAULT_OSD_MIN_CONFIDENCE,
        }
    }

    #[must_use]
    pub fn with_predictor(mut self, predictor: Arc<dyn OrientationPredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    #[must_use]
    pub fn with_scanner(mut self, scanner: Arc<dyn OrientationScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    #[must_use]
    pub fn with_neural_min_confidence(mut self, min_confidence: f32) -> Self {
        self.neural_min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub fn with_osd_min_confidence(mut self, min_confidence: f32) -> Self {
        self.osd_min_confidence = min_confidence;
        self
    }

    /// Walks the tiers and returns the first usable correction.
    pub fn decide(&self, document: &Document) -> OrientationDecision {
        if let Some(angle) = self.try_neural(document) {
            return OrientationDecision {
                angle,
                tier: OrientationTier::Neural,
            };
        }

        if let Some(angle) = self.try_osd(document) {
            return OrientationDecision {
                angle,
                tier: OrientationTier::Osd,
            };
        }

        let (width, height) = document.dimensions();
        let angle = dimension_heuristic(width, height);
        debug!("Dimension heuristic on {}x{} page: {}", width, height, angle);

        OrientationDecision {
            angle,
            tier: OrientationTier::Dimensions,
        }
    }

    /// Decides on a correction and applies it to the document in place.
    ///
    /// Never fails: if the rotated image cannot be written back, the
    /// document is left untouched and `rotated` is `false`.
    #[instrument(skip_all)]
    pub fn correct_orientation(&self, document: &mut Document) -> OrientationOutcome {
        let OrientationDecision { angle, tier } = self.decide(document);

        if angle.is_upright() {
            info!("Orientation is correct ({:?} tier), no rotation needed", tier);
            return OrientationOutcome {
                angle,
                tier,
                rotated: false,
            };
        }

        let rotated = match document.apply_rotation(angle) {
            Ok(()) => {
                info!("Rotated page by {} ({:?} tier)", angle, tier);
                true
            }
            Err(e) => {
                error!("Failed to apply {} rotation: {}", angle, e);
                false
            }
        };

        OrientationOutcome {
            angle,
            tier,
            rotated,
        }
    }

    fn try_neural(&self, document: &Document) -> Option<RotationAngle> {
        let Some(predictor) = &self.predictor else {
            debug!("Neural orientation tier unavailable");
            return None;
        };

        let signal = neural_signal(predictor.predict(document.image()));
        let accepted = accept_neural(&signal, self.neural_min_confidence);

        match (&signal, accepted) {
            (_, Some(angle)) => debug!("Neural tier resolved {}", angle),
            (OrientationSignal::Failed { reason }, None) => {
                warn!("Neural orientation tier failed: {}", reason)
            }
            (OrientationSignal::Resolved { confidence, .. }, None) => warn!(
                "Neural orientation confidence {:?} below {}, falling back",
                confidence, self.neural_min_confidence
            ),
        }

        accepted
    }

    fn try_osd(&self, document: &Document) -> Option<RotationAngle> {
        let Some(scanner) = &self.scanner else {
            debug!("OSD orientation tier unavailable");
            return None;
        };

        let signal = osd_signal(scanner.scan(document));

        match evaluate_osd(&signal, self.osd_min_confidence) {
            OsdVerdict::Accepted(angle) => {
                debug!("OSD tier resolved {}", angle);
                Some(angle)
            }
            OsdVerdict::Unreliable { confidence } => {
                warn!(
                    "OSD confidence {} below {}, falling back to dimensions",
                    confidence, self.osd_min_confidence
                );
                None
            }
            OsdVerdict::NoSignal => {
                if let OrientationSignal::Failed { reason } = &signal {
                    warn!("OSD orientation tier failed: {}", reason);
                } else {
                    debug!("OSD reported zero confidence, falling back to dimensions");
                }
                None
            }
        }
    }
}
