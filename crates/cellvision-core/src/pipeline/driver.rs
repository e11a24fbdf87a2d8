use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::frame::Frame;
use crate::geometry::Target;
use crate::telemetry::{TelemetryPublisher, TelemetrySink};
use crate::video::VideoSink;

use super::cell::CellPipeline;
use super::config::PipelineConfig;
use super::types::{NoOpReporter, PipelineStage, StageReporter, VisionPipeline};

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub frames_processed: usize,
    pub targets_found: usize,
}

/// Runs one detection pass per frame and publishes the result.
///
/// Owns the detection strategy, the telemetry publisher and the video sink.
/// Only the processing worker touches it.
pub struct PipelineDriver {
    pipeline: Box<dyn VisionPipeline>,
    publisher: TelemetryPublisher,
    video: Box<dyn VideoSink>,
    reporter: Arc<dyn StageReporter>,
    stage: PipelineStage,
    stats: DriverStats,
}

impl PipelineDriver {
    /// Driver around the color-threshold [`CellPipeline`].
    pub fn new(
        config: Arc<PipelineConfig>,
        telemetry: Arc<dyn TelemetrySink>,
        video: Box<dyn VideoSink>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        let publisher = TelemetryPublisher::new(config.telemetry.clone(), telemetry);
        let pipeline = CellPipeline::new(config).with_reporter(Arc::clone(&reporter));
        Self::with_pipeline(Box::new(pipeline), publisher, video, reporter)
    }

    /// Driver around any detection strategy.
    pub fn with_pipeline(
        pipeline: Box<dyn VisionPipeline>,
        publisher: TelemetryPublisher,
        video: Box<dyn VideoSink>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        Self {
            pipeline,
            publisher,
            video,
            reporter,
            stage: PipelineStage::Idle,
            stats: DriverStats::default(),
        }
    }

    /// Driver with no progress reporting.
    pub fn headless(
        config: Arc<PipelineConfig>,
        telemetry: Arc<dyn TelemetrySink>,
        video: Box<dyn VideoSink>,
    ) -> Self {
        Self::new(config, telemetry, video, Arc::new(NoOpReporter))
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Process one frame: detect, publish telemetry, push the annotated canvas.
    ///
    /// Always ends in `Idle`. A failed pass publishes nothing.
    pub fn run_pass(&mut self, frame: &Frame) -> Result<Option<Target>> {
        let outcome = match self.pipeline.process(frame) {
            Ok(outcome) => outcome,
            Err(e) => {
                enter(&mut self.stage, self.reporter.as_ref(), PipelineStage::Idle);
                return Err(e);
            }
        };

        enter(&mut self.stage, self.reporter.as_ref(), PipelineStage::Publishing);
        self.publisher.publish(outcome.target.as_ref());
        let pushed = self.video.put_frame(outcome.annotated);

        let frame_index = outcome.frame_index;
        let candidate_count = outcome.candidate_count;
        let target = outcome.target;

        self.stats.frames_processed += 1;
        match &target {
            Some(t) => {
                self.stats.targets_found += 1;
                debug!(
                    frame = frame_index,
                    candidates = candidate_count,
                    radius = t.candidate.radius,
                    angle = t.horizontal_angle,
                    vertical = t.vertical_angle,
                    distance = t.distance,
                    "Target"
                );
            }
            None => debug!(frame = frame_index, candidates = candidate_count, "No target"),
        }

        self.reporter.frame_done(frame_index, target.as_ref());
        enter(&mut self.stage, self.reporter.as_ref(), PipelineStage::Idle);
        pushed?;
        Ok(target)
    }

    /// Flush the video sink and return the run counters.
    pub fn finish(&mut self) -> Result<DriverStats> {
        self.video.finish()?;
        Ok(self.stats)
    }
}

fn enter(slot: &mut PipelineStage, reporter: &dyn StageReporter, stage: PipelineStage) {
    trace!(%stage, "stage");
    *slot = stage;
    reporter.enter_stage(stage);
}
