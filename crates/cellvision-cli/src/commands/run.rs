use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use cellvision_core::pipeline::{run_sequential, run_threaded, PipelineDriver};
use cellvision_core::source::{FrameSource, ImageSequenceSource, SerSource};
use cellvision_core::telemetry::TelemetryTable;
use cellvision_core::video::{open_video_sink, NullVideoSink, VideoSink};
use clap::Args;

use super::{load_config, BarReporter};
use crate::summary::{print_run_header, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    /// SER recording, image file or directory of images (defaults to camera.path)
    pub source: Option<PathBuf>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Record annotated frames: a .ser file or a PNG directory
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Replay the recording endlessly
    #[arg(long = "loop")]
    pub replay_loop: bool,

    /// Replay rate in frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Process every frame on one thread instead of keeping only the newest
    #[arg(long)]
    pub sequential: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.replay_loop {
        config.camera.replay_loop = true;
    }
    if args.fps.is_some() {
        config.camera.fps = args.fps;
    }
    if let Some(ref source) = args.source {
        config.camera.path = Some(source.clone());
    }
    config.validate().context("Invalid configuration")?;

    let Some(source_path) = config.camera.path.clone() else {
        bail!("No frame source given; pass a path or set camera.path in the config");
    };
    let source = open_source(&source_path, config.camera.replay_loop)?;
    let total = source.remaining();

    let video: Box<dyn VideoSink> = match args.video {
        Some(ref path) => open_video_sink(path, config.frame.width, config.frame.height)
            .with_context(|| format!("Failed to open video output {}", path.display()))?,
        None => Box::new(NullVideoSink),
    };

    print_run_header(&config, &source_path, args.video.as_deref());

    let config = Arc::new(config);
    let table = Arc::new(TelemetryTable::new(config.telemetry.table.clone()));
    let reporter = Arc::new(BarReporter::new(total)?);
    let driver = PipelineDriver::new(Arc::clone(&config), table.clone(), video, reporter.clone());

    let started = Instant::now();
    let summary = if args.sequential {
        run_sequential(source, driver)
    } else {
        let pace = config.camera.fps.map(|fps| Duration::from_secs_f64(1.0 / fps));
        run_threaded(source, driver, pace)
    }
    .context("Tracking run failed")?;
    reporter.finish();

    print_run_summary(&summary, &table, started.elapsed());
    Ok(())
}

fn open_source(path: &Path, replay_loop: bool) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        let source = ImageSequenceSource::from_dir(path)
            .with_context(|| format!("Failed to list images in {}", path.display()))?;
        if source.remaining() == Some(0) {
            bail!("No images found in {}", path.display());
        }
        return Ok(Box::new(source));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ser") => Ok(Box::new(
            SerSource::open(path, replay_loop)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        _ => Ok(Box::new(ImageSequenceSource::new(vec![path.to_path_buf()]))),
    }
}
