//! # Pipeline Integration Tests
//!
//! End-to-end tests over small synthetic image pairs: region partition
//! properties, memoization, dimension checking, and persistence.

use std::path::PathBuf;

use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;

use pseudocolour::compositing::{hsv_to_rgb, DEFAULT_SATURATION, STROMA_HUE, TUMOUR_HUE};
use pseudocolour::persistence::{
    COMPOSITE_SUFFIX, STROMA_MASK_SUFFIX, TUMOUR_MASK_SUFFIX,
};
use pseudocolour::{PipelineConfig, PipelineError, PseudoColourPipeline};

/// A 10x10 tumour-marker image: base intensity 50 with a 4x4 block of the
/// given intensity at (3..7, 3..7).
fn tumour_channel_with_block(block_intensity: u8) -> GrayImage {
    GrayImage::from_fn(10, 10, |x, y| {
        if (3..7).contains(&x) && (3..7).contains(&y) {
            Luma([block_intensity])
        } else {
            Luma([50])
        }
    })
}

/// Writes an image pair into a temp directory and returns a ready config.
fn config_for_pair(
    dir: &TempDir,
    tumour: &GrayImage,
    haem: &RgbImage,
    threshold: u8,
) -> PipelineConfig {
    let tumour_path = dir.path().join("tumour.png");
    let haem_path = dir.path().join("haem.png");
    tumour.save(&tumour_path).expect("failed to write tumour fixture");
    haem.save(&haem_path).expect("failed to write haem fixture");

    PipelineConfig::new(
        tumour_path.to_string_lossy().into_owned(),
        haem_path.to_string_lossy().into_owned(),
        threshold,
    )
}

#[test]
fn test_end_to_end_partition_on_synthetic_pair() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    pipeline.build_masks().unwrap();

    let masks = pipeline.region_masks().unwrap();
    assert!(masks.is_partition());

    // The tumour mask covers exactly the 4x4 block
    assert_eq!(masks.tumour.count(), 16);
    for y in 3..7 {
        for x in 3..7 {
            assert!(masks.tumour.get(x, y));
        }
    }
    assert!(!masks.tumour.get(2, 3));

    // Uniform mid-gray haematoxylin has no separable background class
    assert_eq!(masks.background.count(), 0);

    // Everything else is stroma
    assert_eq!(masks.stroma.count(), 84);
}

#[test]
fn test_threshold_boundary_is_strict_end_to_end() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(100);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    pipeline.build_masks().unwrap();
    assert_eq!(pipeline.tumour_mask().unwrap().count(), 0);

    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(101);
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    pipeline.build_masks().unwrap();
    assert_eq!(pipeline.tumour_mask().unwrap().count(), 16);
}

#[test]
fn test_mask_building_is_memoized_and_idempotent() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    pipeline.build_masks().unwrap();
    let first = pipeline.region_masks().unwrap().clone();

    // Deleting the fixtures proves the second call never re-reads or
    // recomputes anything.
    drop(dir);
    pipeline.build_masks().unwrap();
    let second = pipeline.region_masks().unwrap().clone();

    assert_eq!(first, second);
}

#[test]
fn test_dimension_mismatch_is_detected_at_combination() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    assert!(pipeline.load_images().is_ok());
    assert!(matches!(
        pipeline.build_masks(),
        Err(PipelineError::DimensionMismatch {
            expected: (10, 10),
            actual: (8, 8),
        })
    ));
}

#[test]
fn test_composite_recolours_tumour_and_stroma() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    pipeline.run().unwrap();

    let composite = pipeline.final_composite().unwrap();
    assert_eq!(composite.dimensions(), (10, 10));

    // The haematoxylin value channel is 128 everywhere, so each region
    // shows its fixed hue at that brightness
    let (tr, tg, tb) = hsv_to_rgb(TUMOUR_HUE, DEFAULT_SATURATION, 128);
    let (sr, sg, sb) = hsv_to_rgb(STROMA_HUE, DEFAULT_SATURATION, 128);
    assert_eq!(composite.get_pixel(4, 4).0, [tr, tg, tb]);
    assert_eq!(composite.get_pixel(0, 0).0, [sr, sg, sb]);
}

#[test]
fn test_save_outputs_writes_three_tiffs() {
    let dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    let outputs = pipeline.save_outputs("PATIENT_42", out_dir.path()).unwrap();

    let expected: Vec<PathBuf> = [TUMOUR_MASK_SUFFIX, STROMA_MASK_SUFFIX, COMPOSITE_SUFFIX]
        .iter()
        .map(|suffix| out_dir.path().join(format!("PATIENT_42{}.tif", suffix)))
        .collect();
    assert_eq!(outputs.tumour_mask, expected[0]);
    assert_eq!(outputs.stroma_mask, expected[1]);
    assert_eq!(outputs.composite, expected[2]);
    for path in &expected {
        assert!(path.is_file(), "missing output file {}", path.display());
    }

    // The persisted tumour mask round-trips as a 0/255 grayscale image
    let reloaded = image::open(&outputs.tumour_mask).unwrap().to_luma8();
    assert_eq!(reloaded.get_pixel(4, 4)[0], 255);
    assert_eq!(reloaded.get_pixel(0, 0)[0], 0);

    let reloaded_composite = image::open(&outputs.composite).unwrap().to_rgb8();
    assert_eq!(
        &reloaded_composite,
        pipeline.final_composite().unwrap()
    );
}

#[test]
fn test_save_outputs_sanitizes_patient_id() {
    let dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    let outputs = pipeline.save_outputs("P/42", out_dir.path()).unwrap();
    assert_eq!(
        outputs.tumour_mask,
        out_dir.path().join("P_42TUMOUR_REGION_MASK.tif")
    );
    assert!(outputs.tumour_mask.is_file());
}

#[test]
fn test_save_outputs_fails_on_missing_directory() {
    let dir = TempDir::new().unwrap();
    let tumour = tumour_channel_with_block(200);
    let haem = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
    let config = config_for_pair(&dir, &tumour, &haem, 100);

    let mut pipeline = PseudoColourPipeline::new(config).unwrap();
    let result = pipeline.save_outputs("P1", std::path::Path::new("/nonexistent/outputs"));
    assert!(matches!(result, Err(PipelineError::Persistence { .. })));

    // A failed save leaves the computed results in place
    assert!(pipeline.final_composite().is_some());
}
