//! # Pseudo-Colour Tumour Delineation
//!
//! Classifies a paired histology image set (a tumour-marker channel and a
//! haematoxylin channel) into tumour, stroma, and background regions, and
//! renders a pseudo-coloured composite that delineates tumour extent.

pub mod compositing;
pub mod config;
pub mod errors;
pub mod persistence;
pub mod pipeline;
pub mod segmentation;

// Re-export types for easier access
pub use config::PipelineConfig;
pub use errors::{PipelineError, PipelineResult};
pub use pipeline::PseudoColourPipeline;
