//! # Background Mask Builder
//!
//! Derives the background (tissue-void) region mask from the haematoxylin
//! channel. The stage order matters: contrast stretching normalizes the
//! stain distribution, Gaussian smoothing suppresses noise, Otsu's method
//! picks the stained/unstained split automatically, and small-object removal
//! folds spurious stained specks back into the stained class before the
//! final inversion.

use image::{DynamicImage, GrayImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::region_labelling::Connectivity;

use super::contrast::{enhance_contrast, DEFAULT_LOWER_PERCENTILE, DEFAULT_UPPER_PERCENTILE};
use super::morphology::remove_small_objects;
use super::types::{BackgroundMaskResult, BinaryMask, SegmentationError};

/// Parameters for the background mask stage chain.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundMaskParams {
    /// Spatial standard deviation of the Gaussian smoothing step
    pub blur_sigma: f32,
    /// Stained components smaller than this area are treated as noise
    pub min_stained_area: u32,
}

impl Default for BackgroundMaskParams {
    fn default() -> Self {
        Self {
            blur_sigma: 4.0,
            min_stained_area: 1000,
        }
    }
}

/// Builds the background region mask from the haematoxylin channel image.
///
/// Pipeline, in order: contrast stretch, Gaussian blur, Otsu threshold,
/// binarize (stained = intensity at or below the threshold), remove stained
/// components smaller than `min_stained_area`, and invert. The result is
/// `true` where staining is absent, with tiny stained specks counted as
/// stained rather than as separate background islands.
///
/// When Otsu's method cannot separate two intensity classes (a near-constant
/// image), every pixel is classified as stained and the background mask
/// comes back empty.
///
/// # Arguments
///
/// * `haem_image` - The haematoxylin channel image
/// * `params` - Blur sigma and speckle area threshold
///
/// # Returns
///
/// A `BackgroundMaskResult`, or a `SegmentationError` for invalid parameters.
pub fn build_background_mask(
    haem_image: &DynamicImage,
    params: &BackgroundMaskParams,
) -> Result<BackgroundMaskResult, SegmentationError> {
    if !params.blur_sigma.is_finite() || params.blur_sigma <= 0.0 {
        return Err(SegmentationError::InvalidSigma {
            sigma: params.blur_sigma,
        });
    }

    let start_time = std::time::Instant::now();

    let enhanced = enhance_contrast(
        haem_image,
        DEFAULT_LOWER_PERCENTILE,
        DEFAULT_UPPER_PERCENTILE,
    )?;
    let blurred = gaussian_blur_f32(&enhanced, params.blur_sigma);

    let otsu = otsu_threshold(&blurred);
    let (mask, removed_pixels) = match otsu {
        Some(threshold) => {
            let stained = BinaryMask::from_fn(blurred.width(), blurred.height(), |x, y| {
                blurred.get_pixel(x, y)[0] <= threshold
            });
            let (filtered, removed) =
                remove_small_objects(&stained, params.min_stained_area, Connectivity::Eight);
            (filtered.complement(), removed)
        }
        // No class separation means no unstained void anywhere
        None => (BinaryMask::new(blurred.width(), blurred.height()), 0),
    };

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "segmentation",
        "Background mask built in {:.2}ms: otsu_threshold={:?}, background_pixels={}, removed_pixels={}",
        processing_time.as_millis(),
        otsu,
        mask.count(),
        removed_pixels
    );

    Ok(BackgroundMaskResult {
        mask,
        otsu_threshold: otsu,
        removed_pixels,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Finds the global threshold maximizing between-class variance.
///
/// Classic Otsu over a 256-bin histogram. Pixels at or below the returned
/// threshold form the low-intensity class. Returns `None` when no threshold
/// produces positive between-class variance, which happens when the image
/// holds a single intensity class.
pub fn otsu_threshold(image: &GrayImage) -> Option<u8> {
    let total_pixels = (image.width() as f64) * (image.height() as f64);
    if total_pixels == 0.0 {
        return None;
    }

    let mut histogram = [0u32; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    // Cumulative pixel counts and intensity-weighted counts per bin
    let mut cumulative_sums = [0f64; 256];
    let mut cumulative_weighted_sums = [0f64; 256];
    let mut cumulative_sum = 0f64;
    let mut cumulative_weighted_sum = 0f64;
    for (i, &count) in histogram.iter().enumerate() {
        cumulative_sum += count as f64;
        cumulative_weighted_sum += (i as f64) * (count as f64);
        cumulative_sums[i] = cumulative_sum;
        cumulative_weighted_sums[i] = cumulative_weighted_sum;
    }

    let total_weighted_sum = cumulative_weighted_sums[255];

    let mut max_variance = 0f64;
    let mut optimal_threshold: Option<u8> = None;

    for threshold in 0..255usize {
        // Weight of the class at or below the threshold
        let w0 = cumulative_sums[threshold] / total_pixels;
        let w1 = 1.0 - w0;

        if w0 == 0.0 || w1 == 0.0 {
            continue;
        }

        let mu0 = cumulative_weighted_sums[threshold] / cumulative_sums[threshold];
        let mu1 = (total_weighted_sum - cumulative_weighted_sums[threshold])
            / (total_pixels - cumulative_sums[threshold]);

        let variance = w0 * w1 * (mu0 - mu1).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = Some(threshold as u8);
        }
    }

    optimal_threshold
}
