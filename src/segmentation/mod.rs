//! # Region Segmentation Module
//!
//! This module turns the two raw channel images into the three-way region
//! partition that drives the pseudo-colour composite. It is organized into
//! focused sub-modules:
//! - `contrast`: percentile contrast stretching
//! - `tumour`: tumour mask from intensity thresholding plus hole filling
//! - `background`: background mask via Otsu thresholding of the smoothed
//!   haematoxylin channel
//! - `regions`: stroma derivation and the partition invariant
//! - `morphology`: connected-component small-object removal and hole filling
//! - `types`: shared types and error definitions

pub mod background;
pub mod contrast;
pub mod morphology;
pub mod regions;
pub mod tumour;
pub mod types;

// Re-export commonly used types and functions for convenience
pub use types::{BackgroundMaskResult, BinaryMask, SegmentationError, TumourMaskResult};

// Re-export main functions from sub-modules
pub use background::{build_background_mask, otsu_threshold, BackgroundMaskParams};
pub use contrast::enhance_contrast;
pub use morphology::{fill_small_holes, remove_small_objects};
pub use regions::RegionMasks;
pub use tumour::build_tumour_mask;
