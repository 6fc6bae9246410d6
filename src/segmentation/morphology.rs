//! # Binary Morphology Module
//!
//! Area-based cleanup of binary masks: removal of small connected foreground
//! objects and filling of small enclosed holes. Both operations are built on
//! connected-component labelling rather than structuring-element passes, so
//! region boundaries are never eroded.

use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};

use super::types::BinaryMask;

/// Removes connected foreground components smaller than `min_area` pixels.
///
/// Components are measured in pixels and a component survives when its area
/// is at least `min_area`. Used to eliminate speckle noise after
/// thresholding.
///
/// # Arguments
///
/// * `mask` - The binary mask to filter
/// * `min_area` - Minimum component area, in pixels, that survives
/// * `connectivity` - Neighbourhood used for component labelling
///
/// # Returns
///
/// The filtered mask and the number of pixels removed.
pub fn remove_small_objects(
    mask: &BinaryMask,
    min_area: u32,
    connectivity: Connectivity,
) -> (BinaryMask, usize) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || min_area <= 1 {
        return (mask.clone(), 0);
    }

    let labels = connected_components(&mask.to_luma8(), connectivity, Luma([0u8]));

    // Component areas, indexed by label. Label 0 is background.
    let mut areas: Vec<u32> = Vec::new();
    for label in labels.pixels().map(|p| p[0]) {
        if label as usize >= areas.len() {
            areas.resize(label as usize + 1, 0);
        }
        areas[label as usize] += 1;
    }

    let mut removed = 0usize;
    let filtered = BinaryMask::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y)[0];
        if label == 0 {
            return false;
        }
        if areas[label as usize] >= min_area {
            true
        } else {
            removed += 1;
            false
        }
    });

    tracing::debug!(
        target: "segmentation",
        "Small-object removal: min_area={}, removed_pixels={}, dimensions={}x{}",
        min_area,
        removed,
        width,
        height
    );

    (filtered, removed)
}

/// Fills enclosed background pockets smaller than `max_area` pixels.
///
/// The complement of the mask is labelled and a background component is
/// folded into the foreground when it is strictly smaller than `max_area`
/// and does not touch the image border. Border-connected background is never
/// a hole, so the operation only closes interior gaps and never shrinks the
/// foreground.
///
/// # Arguments
///
/// * `mask` - The binary mask whose holes should be filled
/// * `max_area` - Holes strictly smaller than this area are filled
/// * `connectivity` - Neighbourhood used for component labelling
///
/// # Returns
///
/// The filled mask and the number of pixels that changed class.
pub fn fill_small_holes(
    mask: &BinaryMask,
    max_area: u32,
    connectivity: Connectivity,
) -> (BinaryMask, usize) {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || max_area <= 1 {
        return (mask.clone(), 0);
    }

    let holes = mask.complement();
    let labels = connected_components(&holes.to_luma8(), connectivity, Luma([0u8]));

    let mut areas: Vec<u32> = Vec::new();
    let mut touches_border: Vec<bool> = Vec::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0] as usize;
        if label >= areas.len() {
            areas.resize(label + 1, 0);
            touches_border.resize(label + 1, false);
        }
        areas[label] += 1;
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            touches_border[label] = true;
        }
    }

    let mut filled = 0usize;
    let result = BinaryMask::from_fn(width, height, |x, y| {
        if mask.get(x, y) {
            return true;
        }
        let label = labels.get_pixel(x, y)[0] as usize;
        if label != 0 && !touches_border[label] && areas[label] < max_area {
            filled += 1;
            true
        } else {
            false
        }
    });

    tracing::debug!(
        target: "segmentation",
        "Hole filling: max_area={}, filled_pixels={}, dimensions={}x{}",
        max_area,
        filled,
        width,
        height
    );

    (result, filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> BinaryMask {
        BinaryMask::from_fn(width, height, |x, y| x >= x0 && x <= x1 && y >= y0 && y <= y1)
    }

    #[test]
    fn test_remove_small_objects_drops_speckle() {
        // A 4x4 block and an isolated pixel
        let mut mask = rect_mask(20, 20, 2, 2, 5, 5);
        mask.set(15, 15, true);

        let (filtered, removed) = remove_small_objects(&mask, 5, Connectivity::Eight);
        assert_eq!(removed, 1);
        assert!(!filtered.get(15, 15));
        assert_eq!(filtered.count(), 16);
    }

    #[test]
    fn test_remove_small_objects_keeps_exact_area() {
        // Area equal to min_area survives
        let mask = rect_mask(10, 10, 1, 1, 2, 2);
        let (filtered, removed) = remove_small_objects(&mask, 4, Connectivity::Eight);
        assert_eq!(removed, 0);
        assert_eq!(filtered.count(), 4);
    }

    #[test]
    fn test_connectivity_changes_component_membership() {
        // Two pixels touching only diagonally
        let mut mask = BinaryMask::new(6, 6);
        mask.set(2, 2, true);
        mask.set(3, 3, true);

        // Eight-connected they form one component of area 2
        let (eight, _) = remove_small_objects(&mask, 2, Connectivity::Eight);
        assert_eq!(eight.count(), 2);

        // Four-connected they are two singletons and both vanish
        let (four, removed) = remove_small_objects(&mask, 2, Connectivity::Four);
        assert_eq!(four.count(), 0);
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_fill_small_holes_closes_interior_gap() {
        // A solid block with one interior pixel knocked out
        let mut mask = rect_mask(12, 12, 2, 2, 8, 8);
        mask.set(5, 5, false);

        let (filled, count) = fill_small_holes(&mask, 10, Connectivity::Eight);
        assert_eq!(count, 1);
        assert!(filled.get(5, 5));
    }

    #[test]
    fn test_fill_small_holes_ignores_border_background() {
        // The surround of a small block touches the border and stays open
        let mask = rect_mask(10, 10, 3, 3, 6, 6);
        let (filled, count) = fill_small_holes(&mask, 1000, Connectivity::Eight);
        assert_eq!(count, 0);
        assert_eq!(filled, mask);
    }

    #[test]
    fn test_fill_small_holes_respects_area_threshold() {
        // A 3x3 interior hole survives a threshold of 9 but not 10
        let mut mask = rect_mask(15, 15, 1, 1, 13, 13);
        for y in 6..9 {
            for x in 6..9 {
                mask.set(x, y, false);
            }
        }

        let (kept, count_kept) = fill_small_holes(&mask, 9, Connectivity::Eight);
        assert_eq!(count_kept, 0);
        assert!(!kept.get(7, 7));

        let (filled, count_filled) = fill_small_holes(&mask, 10, Connectivity::Eight);
        assert_eq!(count_filled, 9);
        assert!(filled.get(7, 7));
    }
}
