use anyhow::Result;
use pseudocolour::{PipelineConfig, PseudoColourPipeline};
use std::path::Path;
use tracing::info;

/// Initialize structured logging from the environment.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pseudocolour=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    init_tracing();

    let config = PipelineConfig::from_env()?;
    config.validate()?;
    info!(config = %config.summary(), "Configuration loaded");

    let patient_id = config.patient_id.clone();
    let output_dir = config.output_dir.clone();

    let mut pipeline = PseudoColourPipeline::new(config)?;
    pipeline.run()?;

    match (patient_id, output_dir) {
        (Some(patient_id), Some(output_dir)) => {
            let outputs = pipeline.save_outputs(&patient_id, Path::new(&output_dir))?;
            info!(
                tumour_mask = %outputs.tumour_mask.display(),
                stroma_mask = %outputs.stroma_mask.display(),
                composite = %outputs.composite.display(),
                "Outputs written"
            );
        }
        _ => {
            info!("PATIENT_ID or OUTPUT_DIR not set, skipping persistence");
        }
    }

    Ok(())
}
