//! Typed outcomes of the individual orientation tiers.
//!
//! Each tier's raw collaborator output is turned into an
//! [`OrientationSignal`], and each signal is judged by a pure function. The
//! chain in the parent module only wires these together.

use super::angle::RotationAngle;
use crate::inference::InferenceError;

/// Raw output of the neural orientation classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuralPrediction {
    /// Winning class, see [`RotationAngle::from_class_index`].
    pub class_index: usize,
    /// Softmax probability of the winning class, when the model reports one.
    pub confidence: Option<f32>,
}

/// Raw output of the OCR orientation detector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OsdReading {
    /// Counter-clockwise correction in degrees, if an orientation was found.
    pub angle: Option<i32>,
    /// Orientation confidence on a 0-100 scale.
    pub confidence: Option<f32>,
}

/// Outcome of evaluating one tier.
#[derive(Debug, Clone, PartialEq)]
pub enum OrientationSignal {
    Resolved {
        angle: RotationAngle,
        confidence: Option<f32>,
    },
    Failed {
        reason: String,
    },
}

impl OrientationSignal {
    fn failed(reason: impl Into<String>) -> Self {
        OrientationSignal::Failed {
            reason: reason.into(),
        }
    }
}

/// How the OCR orientation reading should be treated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OsdVerdict {
    /// Nothing usable was detected, or the confidence is exactly zero.
    NoSignal,
    /// An angle was produced but its confidence is below the threshold.
    Unreliable { confidence: f32 },
    /// The angle can be trusted.
    Accepted(RotationAngle),
}

/// Converts the neural classifier's result into a signal.
pub fn neural_signal(result: Result<NeuralPrediction, InferenceError>) -> OrientationSignal {
    match result {
        Ok(prediction) => match RotationAngle::from_class_index(prediction.class_index) {
            Some(angle) => OrientationSignal::Resolved {
                angle,
                confidence: prediction.confidence,
            },
            None => OrientationSignal::failed(format!(
                "unexpected orientation class {}",
                prediction.class_index
            )),
        },
        Err(e) => OrientationSignal::failed(e.to_string()),
    }
}

/// Returns the neural angle if its confidence is usable.
///
/// A missing confidence is accepted; a NaN or one below `min_confidence`
/// is not.
pub fn accept_neural(signal: &OrientationSignal, min_confidence: f32) -> Option<RotationAngle> {
    match signal {
        OrientationSignal::Resolved { angle, confidence } => match confidence {
            None => Some(*angle),
            Some(c) if c.is_finite() && *c >= min_confidence => Some(*angle),
            Some(_) => None,
        },
        OrientationSignal::Failed { .. } => None,
    }
}

/// Converts the OCR orientation detector's result into a signal.
pub fn osd_signal(result: Result<OsdReading, InferenceError>) -> OrientationSignal {
    match result {
        Ok(OsdReading {
            angle: Some(degrees),
            confidence,
        }) => match RotationAngle::from_degrees(degrees) {
            Some(angle) => OrientationSignal::Resolved { angle, confidence },
            None => OrientationSignal::failed(format!("non-cardinal angle {degrees}")),
        },
        Ok(OsdReading { angle: None, .. }) => OrientationSignal::failed("no orientation detected"),
        Err(e) => OrientationSignal::failed(e.to_string()),
    }
}

/// Judges an OCR orientation signal against the low-confidence threshold.
///
/// A confidence of exactly `0` is "no signal", a confidence strictly
/// between `0` and `min_confidence` is "unreliable". A reading without a
/// confidence field is trusted.
pub fn evaluate_osd(signal: &OrientationSignal, min_confidence: f32) -> OsdVerdict {
    match signal {
        OrientationSignal::Failed { .. } => OsdVerdict::NoSignal,
        OrientationSignal::Resolved { angle, confidence } => match confidence {
            Some(c) if c.is_nan() || *c == 0.0 => OsdVerdict::NoSignal,
            Some(c) if *c < min_confidence => OsdVerdict::Unreliable { confidence: *c },
            _ => OsdVerdict::Accepted(*angle),
        },
    }
}

/// Last-resort guess from the page shape: landscape pages are assumed to be
/// lying on their side and are turned clockwise.
#[must_use]
pub fn dimension_heuristic(width: u32, height: u32) -> RotationAngle {
    if width > height {
        RotationAngle::Clockwise90
    } else {
        RotationAngle::Upright
    }
}
