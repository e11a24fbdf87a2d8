use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cellvision_core::io::image_io::{load_frame, save_mask_png};
use cellvision_core::pipeline::{FrameSize, PipelineDriver};
use cellvision_core::telemetry::LogTelemetry;
use cellvision_core::video::LatestFrameSink;
use clap::Args;
use tracing::info;

use super::load_config;
use crate::summary::print_target;

#[derive(Args)]
pub struct DetectArgs {
    /// Input image
    pub image: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the annotated canvas as PNG
    #[arg(long)]
    pub annotated: Option<PathBuf>,
}

pub fn run(args: &DetectArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let frame = load_frame(&args.image)
        .with_context(|| format!("Failed to load {}", args.image.display()))?;

    let size = FrameSize {
        width: frame.width(),
        height: frame.height(),
    };
    if size != config.frame {
        info!(
            width = size.width,
            height = size.height,
            "Using image dimensions instead of configured frame size"
        );
        config.frame = size;
    }
    config.validate().context("Invalid configuration")?;

    let config = Arc::new(config);
    let telemetry = Arc::new(LogTelemetry::new(config.telemetry.table.clone()));
    let canvas = LatestFrameSink::new();
    let mut driver = PipelineDriver::headless(Arc::clone(&config), telemetry, Box::new(canvas.clone()));

    let target = driver.run_pass(&frame).context("Detection failed")?;
    driver.finish()?;
    print_target(target.as_ref());

    if let Some(ref path) = args.annotated {
        if let Some(mask) = canvas.latest() {
            save_mask_png(&mask, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("\nAnnotated canvas saved to {}", path.display());
        }
    }
    Ok(())
}
