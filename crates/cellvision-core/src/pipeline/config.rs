use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{
    DEFAULT_FOCAL_LENGTH, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_KEY_DISTANCE,
    DEFAULT_KEY_HORIZONTAL_ANGLE, DEFAULT_KEY_RADIUS, DEFAULT_KEY_VERTICAL_ANGLE,
    DEFAULT_OBJECT_DIAMETER, DEFAULT_TELEMETRY_TABLE,
};
use crate::detection::DetectionConfig;
use crate::error::{Result, VisionError};

/// Immutable per-run configuration. Loaded once, shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub frame: FrameSize,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Dimensions every incoming frame must have.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: usize,
    pub height: usize,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

/// Parameters for converting a circle in pixels into bearing and range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Origin for angle computation, `[x, y]` in pixels.
    #[serde(default = "default_reference_point")]
    pub reference_point: [f64; 2],
    /// Real-world diameter of the object. Distance is reported in the same unit.
    #[serde(default = "default_object_diameter")]
    pub object_diameter: f64,
    /// Effective focal length in pixels.
    #[serde(default = "default_focal_length")]
    pub focal_length: f64,
}

fn default_reference_point() -> [f64; 2] {
    [
        DEFAULT_FRAME_WIDTH as f64 / 2.0,
        DEFAULT_FRAME_HEIGHT as f64 / 2.0,
    ]
}
fn default_object_diameter() -> f64 {
    DEFAULT_OBJECT_DIAMETER
}
fn default_focal_length() -> f64 {
    DEFAULT_FOCAL_LENGTH
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            reference_point: default_reference_point(),
            object_diameter: DEFAULT_OBJECT_DIAMETER,
            focal_length: DEFAULT_FOCAL_LENGTH,
        }
    }
}

/// What happens to published values on a frame without a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Keys keep their last published value.
    #[default]
    Hold,
    /// Keys are deleted so readers observe the absence of a target.
    Invalidate,
}

impl std::fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "Hold"),
            Self::Invalidate => write!(f, "Invalidate"),
        }
    }
}

/// Telemetry table and key names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_key_horizontal")]
    pub horizontal_angle_key: String,
    #[serde(default = "default_key_vertical")]
    pub vertical_angle_key: String,
    #[serde(default = "default_key_distance")]
    pub distance_key: String,
    #[serde(default = "default_key_radius")]
    pub radius_key: String,
    #[serde(default)]
    pub stale_policy: StalePolicy,
}

fn default_table() -> String {
    DEFAULT_TELEMETRY_TABLE.to_string()
}
fn default_key_horizontal() -> String {
    DEFAULT_KEY_HORIZONTAL_ANGLE.to_string()
}
fn default_key_vertical() -> String {
    DEFAULT_KEY_VERTICAL_ANGLE.to_string()
}
fn default_key_distance() -> String {
    DEFAULT_KEY_DISTANCE.to_string()
}
fn default_key_radius() -> String {
    DEFAULT_KEY_RADIUS.to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            horizontal_angle_key: default_key_horizontal(),
            vertical_angle_key: default_key_vertical(),
            distance_key: default_key_distance(),
            radius_key: default_key_radius(),
            stale_policy: StalePolicy::default(),
        }
    }
}

/// Frame source selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// SER recording or image file to read frames from.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Restart the recording when it ends.
    #[serde(default, rename = "loop")]
    pub replay_loop: bool,
    /// Replay rate for recorded sources. `None` replays as fast as frames decode.
    #[serde(default)]
    pub fps: Option<f64>,
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(VisionError::Config(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame.width, self.frame.height
            )));
        }
        self.detection.validate()?;

        let geometry = &self.geometry;
        if !geometry.reference_point.iter().all(|v| v.is_finite()) {
            return Err(VisionError::Config(
                "reference_point must be finite".into(),
            ));
        }
        if !(geometry.object_diameter.is_finite() && geometry.object_diameter > 0.0) {
            return Err(VisionError::Config(format!(
                "object_diameter must be positive, got {}",
                geometry.object_diameter
            )));
        }
        if !(geometry.focal_length.is_finite() && geometry.focal_length > 0.0) {
            return Err(VisionError::Config(format!(
                "focal_length must be positive, got {}",
                geometry.focal_length
            )));
        }

        if let Some(fps) = self.camera.fps {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(VisionError::Config(format!("camera fps must be positive, got {fps}")));
            }
        }

        let telemetry = &self.telemetry;
        let keys = [
            &telemetry.horizontal_angle_key,
            &telemetry.vertical_angle_key,
            &telemetry.distance_key,
            &telemetry.radius_key,
        ];
        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(VisionError::Config("telemetry keys must not be empty".into()));
        }
        Ok(())
    }
}
