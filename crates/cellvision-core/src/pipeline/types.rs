use crate::frame::{Frame, Mask};
use crate::geometry::Target;
use crate::error::Result;

/// Driver state. One pass walks every stage in order and returns to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Preprocessing,
    Segmenting,
    Cleaning,
    ExtractingContours,
    SelectingCandidate,
    EstimatingGeometry,
    Publishing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Preprocessing => write!(f, "Preprocessing"),
            Self::Segmenting => write!(f, "Segmenting"),
            Self::Cleaning => write!(f, "Cleaning"),
            Self::ExtractingContours => write!(f, "Extracting contours"),
            Self::SelectingCandidate => write!(f, "Selecting candidate"),
            Self::EstimatingGeometry => write!(f, "Estimating geometry"),
            Self::Publishing => write!(f, "Publishing"),
        }
    }
}

/// What one pass produced.
#[derive(Debug)]
pub struct FrameOutcome<'a> {
    pub frame_index: usize,
    /// Number of candidates fitted before filtering.
    pub candidate_count: usize,
    pub target: Option<Target>,
    /// Annotation canvas; blank when there is no target.
    pub annotated: &'a Mask,
}

/// A detection strategy: one frame in, optional target and annotation out.
pub trait VisionPipeline: Send {
    fn process(&mut self, frame: &Frame) -> Result<FrameOutcome<'_>>;
}

/// Thread-safe observer of driver progress.
///
/// All methods have default no-op implementations.
pub trait StageReporter: Send + Sync {
    /// The driver moved to `stage`.
    fn enter_stage(&self, _stage: PipelineStage) {}

    /// A full pass finished.
    fn frame_done(&self, _frame_index: usize, _target: Option<&Target>) {}
}

/// No-op reporter used when none is supplied.
pub struct NoOpReporter;
impl StageReporter for NoOpReporter {}
