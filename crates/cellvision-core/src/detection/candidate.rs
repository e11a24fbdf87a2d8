use super::circle::{min_enclosing_circle, Circle};
use super::contours::{Contour, Point};
use super::polygon::simplify_closed;

/// A contour reduced to its simplified polygon and enclosing circle.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Position of the source contour in extraction order.
    pub contour_index: usize,
    pub center: Point,
    /// Enclosing-circle radius in pixels. Never negative.
    pub radius: f64,
    pub polygon: Vec<Point>,
}

impl Candidate {
    pub fn circle(&self) -> Circle {
        Circle {
            center: self.center,
            radius: self.radius,
        }
    }
}

/// Turn every contour into a candidate, preserving extraction order.
pub fn extract_candidates(contours: &[Contour], epsilon: f64) -> Vec<Candidate> {
    contours
        .iter()
        .enumerate()
        .filter_map(|(contour_index, contour)| {
            let polygon = simplify_closed(&contour.points, epsilon);
            let circle = min_enclosing_circle(&polygon)?;
            Some(Candidate {
                contour_index,
                center: circle.center,
                radius: circle.radius,
                polygon,
            })
        })
        .collect()
}

/// Strict admissible band: `min_radius < radius < max_radius`.
pub fn is_admissible(radius: f64, min_radius: f64, max_radius: f64) -> bool {
    min_radius < radius && radius < max_radius
}

/// Pick the admissible candidate with the largest radius.
///
/// Equal radii keep the earliest candidate, so the choice only depends on
/// extraction order. Returns `None` when nothing is admissible.
pub fn select_candidate(candidates: &[Candidate], min_radius: f64, max_radius: f64) -> Option<&Candidate> {
    candidates
        .iter()
        .filter(|c| is_admissible(c.radius, min_radius, max_radius))
        .fold(None, |best: Option<&Candidate>, c| match best {
            Some(b) if c.radius <= b.radius => Some(b),
            _ => Some(c),
        })
}
