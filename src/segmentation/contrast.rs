//! # Contrast Enhancement Module
//!
//! Percentile-based contrast stretching for grayscale intensity images.
//! Used to normalize the haematoxylin channel before smoothing and
//! thresholding.

use image::{DynamicImage, GrayImage};

use super::types::SegmentationError;

/// Default lower percentile for contrast stretching.
pub const DEFAULT_LOWER_PERCENTILE: f32 = 1.0;

/// Default upper percentile for contrast stretching.
pub const DEFAULT_UPPER_PERCENTILE: f32 = 99.0;

/// Rescales an image's intensity distribution by percentile clipping.
///
/// The input is converted to grayscale luma, the `lower_percentile`-th and
/// `upper_percentile`-th intensity values are computed across all pixels, and
/// intensities are linearly rescaled so that the lower percentile maps to 0
/// and the upper percentile maps to 255. Outliers beyond either bound are
/// clipped.
///
/// A near-constant image has equal percentile bounds; in that case every
/// pixel maps to 0 so that downstream thresholding sees a single class.
///
/// # Arguments
///
/// * `image` - The input image to enhance
/// * `lower_percentile` - Lower clipping percentile, typically 1
/// * `upper_percentile` - Upper clipping percentile, typically 99
///
/// # Returns
///
/// Returns the contrast-stretched grayscale image, or a `SegmentationError`
/// if the percentile bounds are invalid.
pub fn enhance_contrast(
    image: &DynamicImage,
    lower_percentile: f32,
    upper_percentile: f32,
) -> Result<GrayImage, SegmentationError> {
    if !(0.0..=100.0).contains(&lower_percentile)
        || !(0.0..=100.0).contains(&upper_percentile)
        || lower_percentile >= upper_percentile
    {
        return Err(SegmentationError::InvalidPercentileRange {
            lower: lower_percentile,
            upper: upper_percentile,
        });
    }

    let gray = image.to_luma8();
    let mut pixels: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
    if pixels.is_empty() {
        return Ok(gray);
    }

    pixels.sort_unstable();

    let len = pixels.len();
    let lower_idx = ((len as f32 * lower_percentile / 100.0) as usize).min(len - 1);
    let upper_idx = ((len as f32 * upper_percentile / 100.0) as usize).min(len - 1);

    let p_lower = pixels[lower_idx];
    let p_upper = pixels[upper_idx];

    if p_upper <= p_lower {
        // Degenerate distribution, map everything to the bottom of the range
        return Ok(GrayImage::new(gray.width(), gray.height()));
    }

    let range = f32::from(p_upper) - f32::from(p_lower);
    let stretched = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        let scaled = (f32::from(v) - f32::from(p_lower)) * 255.0 / range;
        image::Luma([scaled.round().clamp(0.0, 255.0) as u8])
    });

    tracing::debug!(
        target: "segmentation",
        "Contrast stretch completed: p{}={}, p{}={}, dimensions={}x{}",
        lower_percentile,
        p_lower,
        upper_percentile,
        p_upper,
        gray.width(),
        gray.height()
    );

    Ok(stretched)
}
