//! # Pipeline Orchestrator
//!
//! Sequences the delineation stages for one patient's image pair: load the
//! two channel images, build the tumour, background, and stroma masks, and
//! compose the pseudo-coloured output. Each stage is memoized so repeated
//! invocations reuse the already-computed state, and every stage lazily
//! triggers its prerequisites.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::info;

use crate::compositing::{
    adjust_colour, apply_mask, sum_layers, DEFAULT_SATURATION, STROMA_HUE, TUMOUR_HUE,
};
use crate::config::PipelineConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::persistence::{self, PersistedOutputs};
use crate::segmentation::{
    build_background_mask, build_tumour_mask, BackgroundMaskParams, BinaryMask, RegionMasks,
};

/// The two co-registered source images of one run.
#[derive(Debug, Clone)]
struct SourceImages {
    tumour: GrayImage,
    haem: RgbImage,
}

/// Orchestrates mask creation and colour compositing for one image pair.
///
/// State advances monotonically: images are loaded once, masks are built
/// once, the composite is rendered once. Re-invoking any stage is a no-op
/// that returns the memoized result, so callers are free to request stages
/// in any order.
///
/// # Examples
///
/// ```no_run
/// use pseudocolour::{PipelineConfig, PseudoColourPipeline};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::new("tumour.tif", "haem.tif", 100);
/// let mut pipeline = PseudoColourPipeline::new(config)?;
/// pipeline.run()?;
/// let composite = pipeline.final_composite().unwrap();
/// println!("composite is {}x{}", composite.width(), composite.height());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PseudoColourPipeline {
    config: PipelineConfig,
    sources: Option<SourceImages>,
    masks: Option<RegionMasks>,
    composite: Option<RgbImage>,
}

impl PseudoColourPipeline {
    /// Create a pipeline for the given configuration.
    ///
    /// Parameters are validated here, before any image is touched.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sources: None,
            masks: None,
            composite: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load both source images from their configured locations.
    ///
    /// Idempotent; images already in memory are not re-read.
    pub fn load_images(&mut self) -> PipelineResult<()> {
        if self.sources.is_some() {
            return Ok(());
        }

        let tumour = open_image(&self.config.tumour_image_path)?.to_luma8();
        let haem = open_image(&self.config.haem_image_path)?.to_rgb8();

        info!(
            tumour_dimensions = ?tumour.dimensions(),
            haem_dimensions = ?haem.dimensions(),
            "Source images loaded"
        );

        self.sources = Some(SourceImages { tumour, haem });
        Ok(())
    }

    /// Build the tumour, background, and stroma masks in dependency order.
    ///
    /// Loads the source images first if needed. Memoized; a second call
    /// leaves the already-built masks untouched.
    pub fn build_masks(&mut self) -> PipelineResult<()> {
        if self.masks.is_some() {
            return Ok(());
        }

        self.load_images()?;
        let Some(sources) = self.sources.as_ref() else {
            unreachable!("load_images populates the source images");
        };

        let tumour = build_tumour_mask(
            &sources.tumour,
            self.config.tumour_threshold,
            self.config.hole_fill_area(),
        );
        let background = build_background_mask(
            &DynamicImage::ImageRgb8(sources.haem.clone()),
            &BackgroundMaskParams::default(),
        )?;
        let masks = RegionMasks::combine(tumour.mask, background.mask)?;

        info!(
            tumour_pixels = masks.tumour.count(),
            background_pixels = masks.background.count(),
            stroma_pixels = masks.stroma.count(),
            "Region masks built"
        );

        self.masks = Some(masks);
        Ok(())
    }

    /// Render the pseudo-coloured composite from the masked sub-images.
    ///
    /// Builds the masks first if needed. The tumour and stroma sub-images
    /// are recoloured to their fixed hues; the background sub-image keeps
    /// its natural appearance. The three disjoint layers are then summed.
    pub fn build_composite(&mut self) -> PipelineResult<()> {
        if self.composite.is_some() {
            return Ok(());
        }

        self.build_masks()?;
        let (Some(sources), Some(masks)) = (self.sources.as_ref(), self.masks.as_ref()) else {
            unreachable!("build_masks populates the sources and masks");
        };

        let haem = &sources.haem;
        let tumour_layer = adjust_colour(
            &apply_mask(haem, &masks.tumour),
            TUMOUR_HUE,
            DEFAULT_SATURATION,
        );
        let stroma_layer = adjust_colour(
            &apply_mask(haem, &masks.stroma),
            STROMA_HUE,
            DEFAULT_SATURATION,
        );
        let background_layer = apply_mask(haem, &masks.background);

        self.composite = Some(sum_layers(&tumour_layer, &stroma_layer, &background_layer));

        info!("Pseudo-coloured composite rendered");
        Ok(())
    }

    /// Run the full pipeline: load, build masks, composite.
    pub fn run(&mut self) -> PipelineResult<()> {
        self.load_images()?;
        self.build_masks()?;
        self.build_composite()
    }

    /// Persist the tumour mask, stroma mask, and composite.
    ///
    /// Triggers any missing prerequisite stage first. A persistence failure
    /// does not invalidate the in-memory results.
    pub fn save_outputs(
        &mut self,
        patient_id: &str,
        output_dir: &Path,
    ) -> PipelineResult<PersistedOutputs> {
        self.build_composite()?;
        match (self.masks.as_ref(), self.composite.as_ref()) {
            (Some(masks), Some(composite)) => {
                persistence::save_outputs(masks, composite, patient_id, output_dir)
            }
            _ => unreachable!("build_composite populates the masks and composite"),
        }
    }

    /// The tumour mask, if masks have been built.
    pub fn tumour_mask(&self) -> Option<&BinaryMask> {
        self.masks.as_ref().map(|m| &m.tumour)
    }

    /// The background mask, if masks have been built.
    pub fn background_mask(&self) -> Option<&BinaryMask> {
        self.masks.as_ref().map(|m| &m.background)
    }

    /// The stroma mask, if masks have been built.
    pub fn stroma_mask(&self) -> Option<&BinaryMask> {
        self.masks.as_ref().map(|m| &m.stroma)
    }

    /// The full region partition, if masks have been built.
    pub fn region_masks(&self) -> Option<&RegionMasks> {
        self.masks.as_ref()
    }

    /// The final composite image, if it has been rendered.
    pub fn final_composite(&self) -> Option<&RgbImage> {
        self.composite.as_ref()
    }
}

fn open_image(path: &str) -> PipelineResult<DynamicImage> {
    image::open(path).map_err(|e| PipelineError::ImageLoad {
        path: path.to_string(),
        message: e.to_string(),
    })
}
