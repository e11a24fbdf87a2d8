mod cell;
pub mod config;
pub mod draw;
mod driver;
mod runner;
mod types;
mod workspace;

pub use cell::CellPipeline;
pub use config::{CameraConfig, FrameSize, GeometryConfig, PipelineConfig, StalePolicy, TelemetryConfig};
pub use driver::{DriverStats, PipelineDriver};
pub use runner::{run_sequential, run_threaded, FrameSlot, RunSummary};
pub use types::{FrameOutcome, NoOpReporter, PipelineStage, StageReporter, VisionPipeline};
pub use workspace::Workspace;
