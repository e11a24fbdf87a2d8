use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cellvision_core::pipeline::{run_threaded, PipelineDriver};
use cellvision_core::source::SyntheticSource;
use cellvision_core::telemetry::TelemetryTable;
use cellvision_core::video::{open_video_sink, NullVideoSink, VideoSink};
use clap::Args;

use super::{load_config, BarReporter};
use crate::summary::{print_run_header, print_run_summary};

#[derive(Args)]
pub struct DemoArgs {
    /// Number of synthetic frames
    #[arg(long, default_value = "180")]
    pub frames: usize,

    /// Disc radius in pixels
    #[arg(long, default_value = "15")]
    pub radius: f64,

    /// Capture rate in frames per second
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Record annotated frames: a .ser file or a PNG directory
    #[arg(long)]
    pub video: Option<PathBuf>,
}

pub fn run(args: &DemoArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.camera.fps = Some(args.fps);
    config.validate().context("Invalid configuration")?;

    let source = SyntheticSource::new(
        config.frame.width,
        config.frame.height,
        args.radius,
        Some(args.frames),
    );
    let video: Box<dyn VideoSink> = match args.video {
        Some(ref path) => open_video_sink(path, config.frame.width, config.frame.height)
            .with_context(|| format!("Failed to open video output {}", path.display()))?,
        None => Box::new(NullVideoSink),
    };

    print_run_header(&config, Path::new("synthetic"), args.video.as_deref());

    let config = Arc::new(config);
    let table = Arc::new(TelemetryTable::new(config.telemetry.table.clone()));
    let reporter = Arc::new(BarReporter::new(Some(args.frames))?);
    let driver = PipelineDriver::new(Arc::clone(&config), table.clone(), video, reporter.clone());

    let started = Instant::now();
    let pace = Duration::from_secs_f64(1.0 / args.fps);
    let summary = run_threaded(Box::new(source), driver, Some(pace)).context("Demo run failed")?;
    reporter.finish();

    print_run_summary(&summary, &table, started.elapsed());
    Ok(())
}
