//! # Shared Types for Region Segmentation
//!
//! This module contains the types shared across the segmentation sub-modules:
//! the binary region mask, the per-operation result structs, and the
//! segmentation error type.

use image::GrayImage;

/// Errors that can occur during segmentation operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationError {
    /// Percentile bounds are inverted or outside 0..=100
    InvalidPercentileRange { lower: f32, upper: f32 },
    /// Gaussian smoothing sigma is not a positive finite number
    InvalidSigma { sigma: f32 },
    /// Two masks or images disagree on spatial dimensions
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl std::fmt::Display for SegmentationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentationError::InvalidPercentileRange { lower, upper } => {
                write!(
                    f,
                    "Invalid percentile range: lower={} upper={}. Bounds must satisfy 0 <= lower < upper <= 100",
                    lower, upper
                )
            }
            SegmentationError::InvalidSigma { sigma } => {
                write!(
                    f,
                    "Invalid Gaussian sigma: {}. Must be a positive finite number",
                    sigma
                )
            }
            SegmentationError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Dimension mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
        }
    }
}

impl std::error::Error for SegmentationError {}

/// A binary region mask with the same spatial dimensions as its source image.
///
/// `true` marks pixels that belong to the region. Masks are plain boolean
/// grids; the algebra needed by the pipeline (union, complement, subtraction)
/// is provided as methods that return new masks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryMask {
    /// Create an all-`false` mask of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Build a mask by evaluating `f` at every pixel coordinate.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let value = f(x, y);
                mask.set(x, y, value);
            }
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Spatial dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Membership at (x, y). Panics if the coordinate is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Number of pixels inside the region.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Logical complement of the mask.
    pub fn complement(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| !v).collect(),
        }
    }

    /// Pixel-wise union with another mask of identical dimensions.
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a || b)
                .collect(),
        }
    }

    /// Pixels in this mask that are not in `other`.
    pub fn subtract(&self, other: &Self) -> Self {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        Self {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a && !b)
                .collect(),
        }
    }

    /// Render the mask as an 8-bit grayscale image (255 inside, 0 outside).
    ///
    /// Used both for persistence and for handing masks to labelling routines
    /// that operate on image buffers.
    pub fn to_luma8(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([if self.get(x, y) { 255u8 } else { 0u8 }])
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

/// Result of building the tumour region mask.
#[derive(Debug, Clone)]
pub struct TumourMaskResult {
    /// The final tumour mask
    pub mask: BinaryMask,
    /// Intensity threshold used for binarization
    pub threshold: u8,
    /// Number of enclosed hole pixels folded into the foreground
    pub filled_pixels: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of building the background region mask.
#[derive(Debug, Clone)]
pub struct BackgroundMaskResult {
    /// The final background mask
    pub mask: BinaryMask,
    /// Threshold selected by between-class variance maximization, if any
    pub otsu_threshold: Option<u8>,
    /// Number of speckle pixels folded back into the stained class
    pub removed_pixels: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}
