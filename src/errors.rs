//! # Pipeline Error Types
//!
//! This module defines the error types surfaced by the delineation pipeline.
//! Every error is fatal for the stage that raised it; there are no retries
//! and no partial-failure recovery.

use std::fmt;

use crate::segmentation::SegmentationError;

/// Errors surfaced by the delineation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Source image path missing, unreadable, or undecodable
    ImageLoad { path: String, message: String },
    /// Threshold or size parameter outside its valid range
    InvalidParameter { message: String },
    /// Tumour and haematoxylin imagery disagree on spatial dimensions
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Output location unwritable or disk failure during save
    Persistence { path: String, message: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ImageLoad { path, message } => {
                write!(f, "Failed to load image '{}': {}", path, message)
            }
            PipelineError::InvalidParameter { message } => {
                write!(f, "Invalid parameter: {}", message)
            }
            PipelineError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Image dimensions do not match: tumour channel is {}x{}, haematoxylin channel is {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            PipelineError::Persistence { path, message } => {
                write!(f, "Failed to persist '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<SegmentationError> for PipelineError {
    fn from(err: SegmentationError) -> Self {
        match err {
            SegmentationError::DimensionMismatch { expected, actual } => {
                PipelineError::DimensionMismatch { expected, actual }
            }
            other => PipelineError::InvalidParameter {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
