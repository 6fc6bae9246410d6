//! # Pipeline Configuration
//!
//! This module provides the configuration object for one delineation run:
//! the two source image locations, the tumour intensity threshold, and the
//! optional morphological and output settings. It supports loading from
//! environment variables and validation before any image work begins.

use crate::errors::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Default area threshold, in pixels, for hole filling and speckle removal.
pub const DEFAULT_HOLE_FILL_AREA: u32 = 1000;

/// Configuration for one pipeline run over a single patient's image pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Location of the tumour-marker channel image
    pub tumour_image_path: String,
    /// Location of the haematoxylin channel image
    pub haem_image_path: String,
    /// Intensity threshold for tumour candidates (strict greater-than)
    pub tumour_threshold: u8,
    /// Override for the hole-fill area threshold, in pixels
    pub max_nuclei_size: Option<u32>,
    /// Patient identifier used as the output filename prefix
    pub patient_id: Option<String>,
    /// Directory that receives the persisted masks and composite
    pub output_dir: Option<String>,
}

impl PipelineConfig {
    /// Create a configuration with the required parameters only.
    pub fn new(
        tumour_image_path: impl Into<String>,
        haem_image_path: impl Into<String>,
        tumour_threshold: u8,
    ) -> Self {
        Self {
            tumour_image_path: tumour_image_path.into(),
            haem_image_path: haem_image_path.into(),
            tumour_threshold,
            max_nuclei_size: None,
            patient_id: None,
            output_dir: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `TUMOUR_IMAGE_PATH`, `HAEM_IMAGE_PATH` and `TUMOUR_THRESHOLD` are
    /// required; `MAX_NUCLEI_SIZE`, `PATIENT_ID` and `OUTPUT_DIR` are
    /// optional.
    pub fn from_env() -> PipelineResult<Self> {
        let tumour_image_path = env::var("TUMOUR_IMAGE_PATH").map_err(|_| {
            PipelineError::InvalidParameter {
                message: "TUMOUR_IMAGE_PATH environment variable is required".to_string(),
            }
        })?;
        let haem_image_path = env::var("HAEM_IMAGE_PATH").map_err(|_| {
            PipelineError::InvalidParameter {
                message: "HAEM_IMAGE_PATH environment variable is required".to_string(),
            }
        })?;
        let tumour_threshold = env::var("TUMOUR_THRESHOLD")
            .map_err(|_| PipelineError::InvalidParameter {
                message: "TUMOUR_THRESHOLD environment variable is required".to_string(),
            })?
            .parse::<u8>()
            .map_err(|_| PipelineError::InvalidParameter {
                message: "TUMOUR_THRESHOLD must be an integer in 0..=255".to_string(),
            })?;

        let max_nuclei_size = match env::var("MAX_NUCLEI_SIZE") {
            Ok(raw) => Some(raw.parse::<u32>().map_err(|_| {
                PipelineError::InvalidParameter {
                    message: "MAX_NUCLEI_SIZE must be a non-negative integer".to_string(),
                }
            })?),
            Err(_) => None,
        };

        let config = Self {
            tumour_image_path,
            haem_image_path,
            tumour_threshold,
            max_nuclei_size,
            patient_id: env::var("PATIENT_ID").ok(),
            output_dir: env::var("OUTPUT_DIR").ok(),
        };
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.tumour_image_path.trim().is_empty() {
            return Err(PipelineError::InvalidParameter {
                message: "Tumour image path cannot be empty".to_string(),
            });
        }

        if self.haem_image_path.trim().is_empty() {
            return Err(PipelineError::InvalidParameter {
                message: "Haematoxylin image path cannot be empty".to_string(),
            });
        }

        if self.max_nuclei_size == Some(0) {
            return Err(PipelineError::InvalidParameter {
                message: "Max nuclei size cannot be 0".to_string(),
            });
        }

        if let Some(patient_id) = &self.patient_id {
            if patient_id.trim().is_empty() {
                return Err(PipelineError::InvalidParameter {
                    message: "Patient id cannot be empty".to_string(),
                });
            }
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.trim().is_empty() {
                return Err(PipelineError::InvalidParameter {
                    message: "Output directory cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Area threshold used when filling tumour-mask holes.
    pub fn hole_fill_area(&self) -> u32 {
        self.max_nuclei_size.unwrap_or(DEFAULT_HOLE_FILL_AREA)
    }

    /// Get a summary of the current configuration for logging.
    pub fn summary(&self) -> String {
        format!(
            "tumour_image={}, haem_image={}, tumour_threshold={}, hole_fill_area={}, patient_id={:?}, output_dir={:?}",
            self.tumour_image_path,
            self.haem_image_path,
            self.tumour_threshold,
            self.hole_fill_area(),
            self.patient_id,
            self.output_dir
        )
    }
}
