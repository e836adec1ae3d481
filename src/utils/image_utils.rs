use image::{imageops, Rgb, RgbImage};
use ndarray::{Array, Array4};

use crate::document::orientation::RotationAngle;
use crate::utils::error::ImageError;

/// Geometry of a letterboxed image, needed to map model coordinates back to
/// the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxMeta {
    /// Source-to-model scale factor, identical on both axes.
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl LetterboxMeta {
    /// Maps a point in model input space back to source pixels.
    #[must_use]
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

/// Rotates an image by a cardinal angle, growing the canvas as needed.
///
/// Positive angles are counter-clockwise. Quarter turns swap width and
/// height, so no pixel is ever cropped.
pub fn rotate_image(img: &RgbImage, angle: RotationAngle) -> RgbImage {
    match angle {
        RotationAngle::Upright => img.clone(),
        RotationAngle::CounterClockwise90 => imageops::rotate270(img),
        RotationAngle::Clockwise90 => imageops::rotate90(img),
        RotationAngle::UpsideDown => imageops::rotate180(img),
    }
}

/// Resizes to fit a `target`x`target` square keeping the aspect ratio and
/// pads the remainder with `fill`.
pub fn letterbox(
    image: &RgbImage,
    target: u32,
    fill: u8,
) -> Result<(RgbImage, LetterboxMeta), ImageError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::InvalidInput {
            message: "cannot letterbox an empty image".to_string(),
        });
    }

    let scale = (target as f32 / image.width() as f32).min(target as f32 / image.height() as f32);
    let new_width = ((image.width() as f32 * scale).round() as u32).clamp(1, target);
    let new_height = ((image.height() as f32 * scale).round() as u32).clamp(1, target);

    let resized = imageops::resize(image, new_width, new_height, imageops::FilterType::Triangle);

    let pad_x = (target - new_width) / 2;
    let pad_y = (target - new_height) / 2;

    let mut canvas = RgbImage::from_pixel(target, target, Rgb([fill, fill, fill]));
    imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    Ok((
        canvas,
        LetterboxMeta {
            scale,
            pad_x,
            pad_y,
        },
    ))
}

/// Scales the shortest side to `size` and crops the centre square.
pub fn resize_center_crop(image: &RgbImage, size: u32) -> Result<RgbImage, ImageError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageError::InvalidInput {
            message: "cannot crop an empty image".to_string(),
        });
    }

    let scale = size as f32 / image.width().min(image.height()) as f32;
    let new_width = ((image.width() as f32 * scale).round() as u32).max(size);
    let new_height = ((image.height() as f32 * scale).round() as u32).max(size);

    let resized = imageops::resize(image, new_width, new_height, imageops::FilterType::Triangle);

    let x = (new_width - size) / 2;
    let y = (new_height - size) / 2;

    Ok(imageops::crop_imm(&resized, x, y, size, size).to_image())
}

/// Converts an image to a normalized `[1, 3, H, W]` tensor.
///
/// Each channel value becomes `(pixel - mean) * norm`.
pub fn subtract_mean_normalize(
    img: &RgbImage,
    mean_values: &[f32; 3],
    norm_values: &[f32; 3],
) -> Result<Array4<f32>, ImageError> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    if width == 0 || height == 0 {
        return Err(ImageError::InvalidInput {
            message: "cannot normalize an empty image".to_string(),
        });
    }

    let mut input = Array::zeros((1, 3, height, width));

    for (x, y, pixel) in img.enumerate_pixels() {
        for ch in 0..3 {
            let pixel_value = pixel.0[ch] as f32;

            input[[0, ch, y as usize, x as usize]] =
                (pixel_value * norm_values[ch]) - (mean_values[ch] * norm_values[ch]);
        }
    }

    Ok(input)
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.into_iter().map(|v| v / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

/// Index and value of the largest element, ignoring NaNs.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
}
