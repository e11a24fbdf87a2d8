pub mod config;
pub mod demo;
pub mod detect;
pub mod info;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use cellvision_core::geometry::Target;
use cellvision_core::pipeline::{PipelineConfig, StageReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Load the TOML config at `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Progress bar driven by the worker thread.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    /// Bounded bar for a known frame count, spinner otherwise.
    pub fn new(total: Option<usize>) -> Result<Self> {
        let bar = match total {
            Some(n) => {
                let bar = ProgressBar::new(n as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg:28} [{bar:40}] {pos}/{len}")?
                        .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} ({pos} frames)")?);
                bar
            }
        };
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

impl StageReporter for BarReporter {
    fn frame_done(&self, _frame_index: usize, target: Option<&Target>) {
        match target {
            Some(t) => self.bar.set_message(format!(
                "r={:.1} {:+.1}\u{b0} d={:.1}",
                t.candidate.radius, t.horizontal_angle, t.distance
            )),
            None => self.bar.set_message("no target"),
        }
        self.bar.inc(1);
    }
}
