//! # Output Persistence Module
//!
//! Writes the tumour mask, stroma mask, and final composite to disk as TIFF
//! files named by patient identifier plus a fixed suffix. Persistence never
//! invalidates in-memory results; a failed save leaves the pipeline state
//! untouched.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::errors::{PipelineError, PipelineResult};
use crate::segmentation::RegionMasks;

/// Filename suffix for the persisted tumour mask.
pub const TUMOUR_MASK_SUFFIX: &str = "TUMOUR_REGION_MASK";

/// Filename suffix for the persisted stroma mask.
pub const STROMA_MASK_SUFFIX: &str = "STROMA_REGION_MASK";

/// Filename suffix for the persisted composite.
pub const COMPOSITE_SUFFIX: &str = "DELIMINATED_TUMOUR";

/// Extension of every persisted file; TIFF keeps the output lossless.
const OUTPUT_EXTENSION: &str = "tif";

/// Characters replaced during patient-id sanitization.
const FORBIDDEN_ID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '/', '\\', '\0'];

/// Locations of the files written by one persistence pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOutputs {
    pub tumour_mask: PathBuf,
    pub stroma_mask: PathBuf,
    pub composite: PathBuf,
}

/// Replaces path-hostile characters in a patient identifier.
///
/// The identifier becomes a filename prefix, so separators, control
/// characters and other forbidden filename characters are replaced with
/// underscores. A blank identifier is rejected.
pub fn sanitize_patient_id(patient_id: &str) -> PipelineResult<String> {
    let trimmed = patient_id.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidParameter {
            message: "Patient id cannot be empty".to_string(),
        });
    }

    let sanitized: String = trimmed
        .chars()
        .map(|c| {
            if FORBIDDEN_ID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    Ok(sanitized)
}

/// Builds the output path for one artifact of a pipeline run.
pub fn output_path(output_dir: &Path, patient_id: &str, suffix: &str) -> PathBuf {
    output_dir.join(format!("{}{}.{}", patient_id, suffix, OUTPUT_EXTENSION))
}

/// Writes the tumour mask, stroma mask, and composite under `output_dir`.
///
/// Masks are saved as 8-bit grayscale (255 inside the region), the
/// composite as 8-bit RGB. Any filesystem or encoding failure surfaces as
/// `PipelineError::Persistence` for the affected file.
pub fn save_outputs(
    masks: &RegionMasks,
    composite: &RgbImage,
    patient_id: &str,
    output_dir: &Path,
) -> PipelineResult<PersistedOutputs> {
    let patient_id = sanitize_patient_id(patient_id)?;

    if !output_dir.is_dir() {
        return Err(PipelineError::Persistence {
            path: output_dir.display().to_string(),
            message: "Output directory does not exist".to_string(),
        });
    }

    let tumour_path = output_path(output_dir, &patient_id, TUMOUR_MASK_SUFFIX);
    masks
        .tumour
        .to_luma8()
        .save(&tumour_path)
        .map_err(|e| PipelineError::Persistence {
            path: tumour_path.display().to_string(),
            message: e.to_string(),
        })?;

    let stroma_path = output_path(output_dir, &patient_id, STROMA_MASK_SUFFIX);
    masks
        .stroma
        .to_luma8()
        .save(&stroma_path)
        .map_err(|e| PipelineError::Persistence {
            path: stroma_path.display().to_string(),
            message: e.to_string(),
        })?;

    let composite_path = output_path(output_dir, &patient_id, COMPOSITE_SUFFIX);
    composite
        .save(&composite_path)
        .map_err(|e| PipelineError::Persistence {
            path: composite_path.display().to_string(),
            message: e.to_string(),
        })?;

    tracing::info!(
        patient_id = %patient_id,
        output_dir = %output_dir.display(),
        "Persisted tumour mask, stroma mask, and composite"
    );

    Ok(PersistedOutputs {
        tumour_mask: tumour_path,
        stroma_mask: stroma_path,
        composite: composite_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_concatenates_prefix_and_suffix() {
        let path = output_path(Path::new("/data/out"), "P1", TUMOUR_MASK_SUFFIX);
        assert_eq!(
            path,
            PathBuf::from("/data/out/P1TUMOUR_REGION_MASK.tif")
        );
    }

    #[test]
    fn test_sanitize_patient_id_replaces_separators() {
        assert_eq!(sanitize_patient_id("P/1\\2").unwrap(), "P_1_2");
        assert_eq!(sanitize_patient_id("  P-3  ").unwrap(), "P-3");
        assert_eq!(sanitize_patient_id("a<b>c").unwrap(), "a_b_c");
    }

    #[test]
    fn test_sanitize_patient_id_rejects_blank() {
        assert!(sanitize_patient_id("   ").is_err());
        assert!(sanitize_patient_id("").is_err());
    }
}
