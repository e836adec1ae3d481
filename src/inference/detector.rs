use std::path::Path;

use image::RgbImage;
use ort::{inputs, session::builder::PrepackedWeights, session::Session, value::Value};

use crate::document::bounds::BoundingBox;
use crate::document::pipeline::SignatureDetector;
use crate::document::scored_box::ScoredBox;
use crate::document::Document;
use crate::inference::error::InferenceError;
use crate::inference::session_pool::{self, SessionPool};
use crate::utils::image_utils::{self, LetterboxMeta};

/// Layout of a YOLO detection head output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YoloOutputLayout {
    /// `4 + num_classes`
    pub channels: usize,
    /// Number of candidate boxes.
    pub anchors: usize,
    /// `true` for `[1, channels, anchors]`, `false` for `[1, anchors, channels]`.
    pub channel_major: bool,
}

impl YoloOutputLayout {
    /// Infers the layout from a `[1, a, b]` output shape. The candidate
    /// count is always the larger of the two axes.
    pub fn from_shape(shape: &[i64]) -> Option<Self> {
        if shape.len() != 3 {
            return None;
        }
        let (a, b) = (usize::try_from(shape[1]).ok()?, usize::try_from(shape[2]).ok()?);
        let (channels, anchors, channel_major) = if a <= b { (a, b, true) } else { (b, a, false) };

        if channels < 5 {
            return None;
        }

        Some(Self {
            channels,
            anchors,
            channel_major,
        })
    }

    #[inline]
    fn value(&self, data: &[f32], channel: usize, anchor: usize) -> f32 {
        if self.channel_major {
            data[channel * self.anchors + anchor]
        } else {
            data[anchor * self.channels + channel]
        }
    }
}

/// Turns raw YOLO output into source-space boxes.
///
/// Boxes whose best class score is below `conf_threshold` are dropped.
/// Overlapping boxes are returned as-is.
pub fn decode_detections(
    data: &[f32],
    layout: YoloOutputLayout,
    meta: LetterboxMeta,
    conf_threshold: f32,
    image_size: (u32, u32),
) -> Vec<ScoredBox> {
    let (width, height) = (image_size.0 as f32, image_size.1 as f32);

    if data.len() < layout.channels * layout.anchors {
        return Vec::new();
    }

    (0..layout.anchors)
        .filter_map(|anchor| {
            let confidence = (4..layout.channels)
                .map(|channel| layout.value(data, channel, anchor))
                .fold(f32::NEG_INFINITY, f32::max);

            if !(confidence >= conf_threshold) {
                return None;
            }

            let cx = layout.value(data, 0, anchor);
            let cy = layout.value(data, 1, anchor);
            let w = layout.value(data, 2, anchor);
            let h = layout.value(data, 3, anchor);

            let model_box = BoundingBox::from_center(cx, cy, w, h);
            let (x_min, y_min) = meta.to_source(model_box.x_min(), model_box.y_min());
            let (x_max, y_max) = meta.to_source(model_box.x_max(), model_box.y_max());

            let bounds = BoundingBox::new(x_min, y_min, x_max, y_max).clamp_to(width, height);
            if bounds.area() <= 0.0 {
                return None;
            }

            Some(ScoredBox::new(bounds, confidence))
        })
        .collect()
}

/// Signature detector exported from a YOLO detection model.
pub struct YoloDetector {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: u32,
    conf_threshold: f32,
}

impl YoloDetector {
    const NUM_THREADS: usize = 4;
    const PAD_VALUE: u8 = 114;

    pub fn new(
        model_path: &Path,
        prepacked: &PrepackedWeights,
        conf_threshold: f32,
    ) -> Result<Self, InferenceError> {
        let session = session_pool::load_session(model_path, prepacked, Self::NUM_THREADS)?;
        let input_name = session_pool::first_input_name(&session)?;
        let output_name = session_pool::first_output_name(&session)?;

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size: 640,
            conf_threshold,
        })
    }

    /// Loads `pool_size` sessions of the model.
    pub fn pool(
        model_path: &Path,
        pool_size: usize,
        conf_threshold: f32,
    ) -> Result<SessionPool<Self>, InferenceError> {
        SessionPool::new(pool_size, |w| Self::new(model_path, w, conf_threshold))
    }

    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<ScoredBox>, InferenceError> {
        let (letterboxed, meta) = image_utils::letterbox(image, self.input_size, Self::PAD_VALUE)
            .map_err(|e| InferenceError::PreprocessingError {
                operation: "letterbox image".to_string(),
                message: e.to_string(),
            })?;

        let input_array =
            image_utils::subtract_mean_normalize(&letterboxed, &[0.0; 3], &[1.0 / 255.0; 3])
                .map_err(|e| InferenceError::PreprocessingError {
                    operation: "normalize image".to_string(),
                    message: e.to_string(),
                })?;

        let shape = input_array.shape().to_vec();
        let (data, _offset) = input_array.into_raw_vec_and_offset();
        let input_value = Value::from_array((shape.as_slice(), data)).map_err(|e| {
            InferenceError::PreprocessingError {
                operation: "create input value".to_string(),
                message: e.to_string(),
            }
        })?;

        let outputs = self
            .session
            .run(inputs![self.input_name.as_str() => input_value])
            .map_err(|source| InferenceError::ModelExecutionError {
                operation: "detector forward pass".to_string(),
                source,
            })?;

        let (output_shape, output_data) = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError::PredictionError {
                operation: "get model outputs".to_string(),
                message: format!("Output '{}' not found", self.output_name),
            })?
            .try_extract_tensor::<f32>()
            .map_err(|source| InferenceError::PredictionError {
                operation: "extract output tensor".to_string(),
                message: source.to_string(),
            })?;

        let dims: Vec<i64> = output_shape.iter().copied().collect();
        let layout =
            YoloOutputLayout::from_shape(&dims).ok_or_else(|| InferenceError::PredictionError {
                operation: "read detector output".to_string(),
                message: format!("unexpected output shape {dims:?}"),
            })?;

        Ok(decode_detections(
            output_data,
            layout,
            meta,
            self.conf_threshold,
            image.dimensions(),
        ))
    }
}

impl SignatureDetector for SessionPool<YoloDetector> {
    fn detect(&self, document: &Document) -> Result<Vec<ScoredBox>, InferenceError> {
        self.with(|model| model.detect(document.image()))
    }
}
