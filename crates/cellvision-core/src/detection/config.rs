use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GAMMA, DEFAULT_HSV_LOWER, DEFAULT_HSV_UPPER, DEFAULT_KERNEL_SIZE, DEFAULT_MAX_RADIUS,
    DEFAULT_MEDIAN_BLUR, DEFAULT_MIN_RADIUS, DEFAULT_POLYGON_EPSILON,
};
use crate::error::{Result, VisionError};

/// Thresholds and shape parameters for finding the cell in a single frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Power-law exponent applied before color conversion.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Inclusive lower HSV bound (H in [0, 180), S and V in [0, 255]).
    #[serde(default = "default_hsv_lower")]
    pub hsv_lower: [u8; 3],
    /// Inclusive upper HSV bound.
    #[serde(default = "default_hsv_upper")]
    pub hsv_upper: [u8; 3],
    /// Side of the square opening kernel. Values <= 1 disable the opening.
    #[serde(default = "default_kernel_size")]
    pub kernel_size: i32,
    /// Odd median blur aperture applied to the HSV frame. 0 disables it.
    #[serde(default = "default_median_blur")]
    pub median_blur: usize,
    /// Exclusive lower bound on the enclosing-circle radius.
    #[serde(default = "default_min_radius")]
    pub min_radius: f64,
    /// Exclusive upper bound on the enclosing-circle radius.
    #[serde(default = "default_max_radius")]
    pub max_radius: f64,
    /// Polygon simplification tolerance in pixels.
    #[serde(default = "default_polygon_epsilon")]
    pub polygon_epsilon: f64,
}

fn default_gamma() -> f64 {
    DEFAULT_GAMMA
}
fn default_hsv_lower() -> [u8; 3] {
    DEFAULT_HSV_LOWER
}
fn default_hsv_upper() -> [u8; 3] {
    DEFAULT_HSV_UPPER
}
fn default_kernel_size() -> i32 {
    DEFAULT_KERNEL_SIZE
}
fn default_median_blur() -> usize {
    DEFAULT_MEDIAN_BLUR
}
fn default_min_radius() -> f64 {
    DEFAULT_MIN_RADIUS
}
fn default_max_radius() -> f64 {
    DEFAULT_MAX_RADIUS
}
fn default_polygon_epsilon() -> f64 {
    DEFAULT_POLYGON_EPSILON
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            hsv_lower: DEFAULT_HSV_LOWER,
            hsv_upper: DEFAULT_HSV_UPPER,
            kernel_size: DEFAULT_KERNEL_SIZE,
            median_blur: DEFAULT_MEDIAN_BLUR,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            polygon_epsilon: DEFAULT_POLYGON_EPSILON,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(VisionError::Config(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        for c in 0..3 {
            if self.hsv_lower[c] > self.hsv_upper[c] {
                return Err(VisionError::Config(format!(
                    "HSV channel {c}: lower bound {} exceeds upper bound {}",
                    self.hsv_lower[c], self.hsv_upper[c]
                )));
            }
        }
        if self.median_blur != 0 && self.median_blur % 2 == 0 {
            return Err(VisionError::Config(format!(
                "median_blur must be odd or 0, got {}",
                self.median_blur
            )));
        }
        if !(self.min_radius.is_finite() && self.min_radius >= 0.0) {
            return Err(VisionError::Config(format!(
                "min_radius must be non-negative, got {}",
                self.min_radius
            )));
        }
        if !self.max_radius.is_finite() || self.min_radius >= self.max_radius {
            return Err(VisionError::Config(format!(
                "radius band ({}, {}) is empty",
                self.min_radius, self.max_radius
            )));
        }
        if !(self.polygon_epsilon.is_finite() && self.polygon_epsilon >= 0.0) {
            return Err(VisionError::Config(format!(
                "polygon_epsilon must be non-negative, got {}",
                self.polygon_epsilon
            )));
        }
        Ok(())
    }
}
