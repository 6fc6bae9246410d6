//! # Region Mask Set
//!
//! Combines the tumour and background masks into the three-way region
//! partition used by the compositor. Stroma is everything that is neither
//! tumour nor background.

use super::types::{BinaryMask, SegmentationError};

/// The three mutually exclusive region masks of one pipeline run.
///
/// The masks are pairwise disjoint and their union covers the full image
/// extent: every pixel belongs to exactly one of tumour, background, or
/// stroma. `combine` enforces this by resolving tumour/background overlap in
/// favour of tumour before deriving stroma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMasks {
    /// Pixels classified as tumour
    pub tumour: BinaryMask,
    /// Pixels classified as tissue-void background
    pub background: BinaryMask,
    /// Remaining tissue, the stromal compartment
    pub stroma: BinaryMask,
}

impl RegionMasks {
    /// Derives the stroma mask and assembles the full region partition.
    ///
    /// Both input masks are heuristic, so a pixel can trip both classifiers;
    /// such pixels are assigned to tumour and dropped from background. The
    /// stroma mask is the complement of the union of the other two.
    ///
    /// # Arguments
    ///
    /// * `tumour` - The tumour region mask
    /// * `background` - The background region mask
    ///
    /// # Returns
    ///
    /// The partition, or `SegmentationError::DimensionMismatch` when the two
    /// masks disagree on spatial dimensions.
    pub fn combine(
        tumour: BinaryMask,
        background: BinaryMask,
    ) -> Result<Self, SegmentationError> {
        if tumour.dimensions() != background.dimensions() {
            return Err(SegmentationError::DimensionMismatch {
                expected: tumour.dimensions(),
                actual: background.dimensions(),
            });
        }

        let background = background.subtract(&tumour);
        let stroma = tumour.union(&background).complement();

        Ok(Self {
            tumour,
            background,
            stroma,
        })
    }

    /// Spatial dimensions shared by all three masks.
    pub fn dimensions(&self) -> (u32, u32) {
        self.tumour.dimensions()
    }

    /// Whether every pixel belongs to exactly one region.
    pub fn is_partition(&self) -> bool {
        let (width, height) = self.dimensions();
        for y in 0..height {
            for x in 0..width {
                let memberships = [
                    self.tumour.get(x, y),
                    self.background.get(x, y),
                    self.stroma.get(x, y),
                ];
                if memberships.iter().filter(|&&m| m).count() != 1 {
                    return false;
                }
            }
        }
        true
    }
}
