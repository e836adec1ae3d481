//! Axis-aligned bounding boxes for detector output.
//!
//! This module provides the [`BoundingBox`] type used by the signature
//! detector and the deduplication step.

use geo::{coord, Area, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An axis-aligned rectangle in image pixel coordinates.
///
/// The rectangle is backed by a [`geo::Rect`], so corners passed in the wrong
/// order are normalised on construction and `x_max >= x_min`,
/// `y_max >= y_min` always hold.
///
/// # Coordinate System
///
/// - **X-axis**: Increases from left to right
/// - **Y-axis**: Increases from top to bottom (standard image coordinates)
///
/// # Serialization
///
/// Serializes as a flat `[x_min, y_min, x_max, y_max]` array:
///
/// ```json
/// [12.0, 40.5, 180.0, 96.0]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    rect: Rect<f32>,
}

impl BoundingBox {
    /// Creates a box from its two corners.
    #[inline]
    #[must_use]
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            rect: Rect::new(coord! { x: x_min, y: y_min }, coord! { x: x_max, y: y_max }),
        }
    }

    /// Creates a box from a center point and a size, the layout YOLO-style
    /// detectors emit.
    #[must_use]
    pub fn from_center(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self::new(
            center_x - half_w,
            center_y - half_h,
            center_x + half_w,
            center_y + half_h,
        )
    }

    #[inline]
    pub fn x_min(&self) -> f32 {
        self.rect.min().x
    }

    #[inline]
    pub fn y_min(&self) -> f32 {
        self.rect.min().y
    }

    #[inline]
    pub fn x_max(&self) -> f32 {
        self.rect.max().x
    }

    #[inline]
    pub fn y_max(&self) -> f32 {
        self.rect.max().y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.rect.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.rect.height()
    }

    /// Area of the box. Zero for degenerate (line or point) boxes.
    #[inline]
    pub fn area(&self) -> f32 {
        self.rect.unsigned_area()
    }

    /// Returns a copy clipped to `[0, width] x [0, height]`.
    #[must_use]
    pub fn clamp_to(&self, width: f32, height: f32) -> Self {
        Self::new(
            self.x_min().clamp(0.0, width),
            self.y_min().clamp(0.0, height),
            self.x_max().clamp(0.0, width),
            self.y_max().clamp(0.0, height),
        )
    }

    /// The box as `[x_min, y_min, x_max, y_max]`.
    #[must_use]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x_min(), self.y_min(), self.x_max(), self.y_max()]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(coords: [f32; 4]) -> Self {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl Serialize for BoundingBox {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

/// Deserializes a `BoundingBox` from a four-element number array.
///
/// # Errors
///
/// Returns an error if the input does not contain exactly 4 numbers.
impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<f32> = Vec::deserialize(deserializer)?;
        if values.len() != 4 {
            return Err(serde::de::Error::custom(format!(
                "Expected 4 coordinates, got {}",
                values.len()
            )));
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}
