//! # Tumour Mask Builder
//!
//! Derives the tumour region mask from the tumour-marker channel by simple
//! intensity thresholding followed by hole filling.

use image::GrayImage;
use imageproc::region_labelling::Connectivity;

use super::morphology::fill_small_holes;
use super::types::{BinaryMask, TumourMaskResult};

/// Builds the tumour region mask from the tumour-marker channel image.
///
/// A pixel is a tumour candidate when its intensity is strictly greater than
/// `threshold`. Enclosed background pockets smaller than `hole_fill_area`
/// pixels are then folded into the region, closing the small gaps that
/// nuclei leave in an otherwise solid tumour area. No further smoothing is
/// applied.
///
/// # Arguments
///
/// * `tumour_image` - Grayscale tumour-marker channel image
/// * `threshold` - Intensity threshold; candidates must exceed it strictly
/// * `hole_fill_area` - Holes strictly smaller than this area are filled
///
/// # Returns
///
/// A `TumourMaskResult` carrying the mask and stage metadata.
///
/// # Examples
///
/// ```no_run
/// use pseudocolour::segmentation::build_tumour_mask;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("tumour_channel.tif")?.to_luma8();
/// let result = build_tumour_mask(&img, 100, 1000);
/// println!("tumour pixels: {}", result.mask.count());
/// # Ok(())
/// # }
/// ```
pub fn build_tumour_mask(
    tumour_image: &GrayImage,
    threshold: u8,
    hole_fill_area: u32,
) -> TumourMaskResult {
    let start_time = std::time::Instant::now();

    let candidates = BinaryMask::from_fn(tumour_image.width(), tumour_image.height(), |x, y| {
        tumour_image.get_pixel(x, y)[0] > threshold
    });

    let (mask, filled_pixels) = fill_small_holes(&candidates, hole_fill_area, Connectivity::Eight);

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "segmentation",
        "Tumour mask built in {:.2}ms: threshold={}, region_pixels={}, filled_pixels={}",
        processing_time.as_millis(),
        threshold,
        mask.count(),
        filled_pixels
    );

    TumourMaskResult {
        mask,
        threshold,
        filled_pixels,
        processing_time_ms: processing_time.as_millis() as u32,
    }
}
