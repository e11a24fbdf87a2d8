//! Bearing and range of a selected candidate.
use crate::detection::{Candidate, Point};
use crate::pipeline::config::GeometryConfig;

/// Angular offset from the reference point, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bearing {
    pub horizontal: f64,
    pub vertical: f64,
}

/// The candidate chosen for a frame, with its bearing and range.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub candidate: Candidate,
    pub horizontal_angle: f64,
    pub vertical_angle: f64,
    /// Same unit as the configured object diameter.
    pub distance: f64,
}

/// Bearing of `center` relative to `reference`.
///
/// With a vertical offset the horizontal angle is `atan(dx / dy)`; with only
/// a horizontal offset the vertical angle is `atan(dy / dx)`. The other angle
/// is the complement to 90 degrees. A center on the reference point has no
/// bearing and reports zero for both angles.
pub fn bearing(center: Point, reference: [f64; 2]) -> Bearing {
    let dx = center.x - reference[0];
    let dy = center.y - reference[1];

    if dy.abs() > 0.0 {
        let horizontal = (dx / dy).atan().to_degrees();
        Bearing {
            horizontal,
            vertical: 90.0 - horizontal,
        }
    } else if dx.abs() > 0.0 {
        let vertical = (dy / dx).atan().to_degrees();
        Bearing {
            horizontal: 90.0 - vertical,
            vertical,
        }
    } else {
        Bearing {
            horizontal: 0.0,
            vertical: 0.0,
        }
    }
}

/// Pinhole range estimate `diameter * focal_length / (2 * radius)`.
///
/// Undefined for a non-positive radius, which yields `None`.
pub fn distance(radius: f64, object_diameter: f64, focal_length: f64) -> Option<f64> {
    if radius > 0.0 {
        Some(object_diameter * focal_length / (2.0 * radius))
    } else {
        None
    }
}

/// Attach bearing and range to a selected candidate.
pub fn estimate_target(candidate: &Candidate, geometry: &GeometryConfig) -> Option<Target> {
    let range = distance(candidate.radius, geometry.object_diameter, geometry.focal_length)?;
    let Bearing {
        horizontal,
        vertical,
    } = bearing(candidate.center, geometry.reference_point);
    Some(Target {
        candidate: candidate.clone(),
        horizontal_angle: horizontal,
        vertical_angle: vertical,
        distance: range,
    })
}
