use std::sync::Arc;

use tracing::trace;

use crate::color::hsv::remap_to_hsv_into;
use crate::consts::COLOR_CHANNEL_COUNT;
use crate::detection::morphology::morphological_opening_into;
use crate::detection::threshold::in_range_into;
use crate::detection::{extract_candidates, find_contours, select_candidate, Candidate};
use crate::error::{Result, VisionError};
use crate::filters::levels::gamma_lut;
use crate::filters::median::median_blur_into;
use crate::frame::{Frame, Mask};
use crate::geometry::estimate_target;

use super::config::PipelineConfig;
use super::draw::{draw_circle, draw_polygon};
use super::types::{FrameOutcome, NoOpReporter, PipelineStage, StageReporter, VisionPipeline};
use super::workspace::Workspace;

/// Color-threshold detector for a single round game piece.
///
/// Pipeline: gamma + HSV -> (median blur) -> in-range mask -> opening ->
/// border following -> polygon + enclosing circle -> radius filter ->
/// largest circle -> bearing and range.
pub struct CellPipeline {
    config: Arc<PipelineConfig>,
    lut: [u8; 256],
    workspace: Workspace,
    stage: PipelineStage,
    reporter: Arc<dyn StageReporter>,
}

impl CellPipeline {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        let lut = gamma_lut(config.detection.gamma);
        let workspace = Workspace::new(config.frame);
        Self {
            config,
            lut,
            workspace,
            stage: PipelineStage::Idle,
            reporter: Arc::new(NoOpReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StageReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current stage. `Idle` between passes.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Color mask of the last pass, before cleaning.
    pub fn mask(&self) -> &Mask {
        &self.workspace.mask
    }

    /// Mask of the last pass after the opening.
    pub fn cleaned_mask(&self) -> &Mask {
        &self.workspace.cleaned
    }

    pub fn canvas(&self) -> &Mask {
        &self.workspace.canvas
    }

    fn enter(&mut self, stage: PipelineStage) {
        trace!(%stage, "stage");
        self.stage = stage;
        self.reporter.enter_stage(stage);
    }

    /// Returns to `Idle` without reporting it. Whoever owns the reporter
    /// announces `Idle` once the frame is fully handled.
    fn settle(&mut self) {
        trace!(stage = %PipelineStage::Idle, "stage");
        self.stage = PipelineStage::Idle;
    }

    fn check_dimensions(&self, frame: &Frame) -> Result<()> {
        let expected = self.config.frame;
        let (height, width, channels) = frame.data.dim();
        if width != expected.width || height != expected.height || channels != COLOR_CHANNEL_COUNT {
            return Err(VisionError::DimensionMismatch {
                expected_width: expected.width,
                expected_height: expected.height,
                expected_channels: COLOR_CHANNEL_COUNT,
                actual_width: width,
                actual_height: height,
                actual_channels: channels,
            });
        }
        Ok(())
    }
}

impl VisionPipeline for CellPipeline {
    fn process(&mut self, frame: &Frame) -> Result<FrameOutcome<'_>> {
        self.enter(PipelineStage::Preprocessing);
        if let Err(e) = self.check_dimensions(frame) {
            self.settle();
            return Err(e);
        }
        self.workspace.reset();

        let config = Arc::clone(&self.config);
        let detection = &config.detection;

        {
            let ws = &mut self.workspace;
            remap_to_hsv_into(frame, &self.lut, &mut ws.hsv);
            if detection.median_blur > 1 {
                median_blur_into(&ws.hsv, detection.median_blur, &mut ws.blurred);
                std::mem::swap(&mut ws.hsv, &mut ws.blurred);
            }
        }

        self.enter(PipelineStage::Segmenting);
        in_range_into(
            &self.workspace.hsv,
            detection.hsv_lower,
            detection.hsv_upper,
            &mut self.workspace.mask,
        );

        self.enter(PipelineStage::Cleaning);
        {
            let ws = &mut self.workspace;
            morphological_opening_into(&ws.mask, detection.kernel_size, &mut ws.eroded, &mut ws.cleaned);
        }

        self.enter(PipelineStage::ExtractingContours);
        let contours = find_contours(&self.workspace.cleaned);
        let candidates = extract_candidates(&contours, detection.polygon_epsilon);

        self.enter(PipelineStage::SelectingCandidate);
        let selected: Option<Candidate> =
            select_candidate(&candidates, detection.min_radius, detection.max_radius).cloned();

        let target = match selected {
            Some(candidate) => {
                self.enter(PipelineStage::EstimatingGeometry);
                let target = estimate_target(&candidate, &config.geometry);
                if target.is_some() {
                    draw_polygon(&mut self.workspace.canvas, &candidate.polygon);
                    draw_circle(&mut self.workspace.canvas, &candidate.circle());
                }
                target
            }
            None => None,
        };

        self.settle();
        Ok(FrameOutcome {
            frame_index: frame.metadata.frame_index,
            candidate_count: candidates.len(),
            target,
            annotated: &self.workspace.canvas,
        })
    }
}
