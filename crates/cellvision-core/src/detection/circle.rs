use crate::consts::ENCLOSING_CIRCLE_EPSILON;

use super::contours::Point;

/// A circle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    fn contains(&self, p: &Point) -> bool {
        self.center.distance(p) <= self.radius * (1.0 + ENCLOSING_CIRCLE_EPSILON) + ENCLOSING_CIRCLE_EPSILON
    }

    fn from_diameter(a: &Point, b: &Point) -> Self {
        let center = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        Self {
            center,
            radius: a.distance(b) / 2.0,
        }
    }

    /// Smallest circle through three points. Collinear triples fall back to
    /// the circle on their farthest pair.
    fn from_three(a: &Point, b: &Point, c: &Point) -> Self {
        let bx = b.x - a.x;
        let by = b.y - a.y;
        let cx = c.x - a.x;
        let cy = c.y - a.y;
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < f64::EPSILON {
            let pairs = [
                Self::from_diameter(a, b),
                Self::from_diameter(a, c),
                Self::from_diameter(b, c),
            ];
            return pairs
                .into_iter()
                .max_by(|p, q| p.radius.total_cmp(&q.radius))
                .unwrap_or_else(|| Self::from_diameter(a, b));
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Self {
            center: Point::new(a.x + ux, a.y + uy),
            radius: ux.hypot(uy),
        }
    }
}

/// Minimal circle enclosing all `points` (incremental Welzl construction).
///
/// Points are visited in the given order, so the result is deterministic.
/// Returns `None` for an empty input; a single point yields radius 0.
pub fn min_enclosing_circle(points: &[Point]) -> Option<Circle> {
    let first = points.first()?;
    let mut circle = Circle {
        center: *first,
        radius: 0.0,
    };

    for i in 1..points.len() {
        if circle.contains(&points[i]) {
            continue;
        }
        circle = Circle {
            center: points[i],
            radius: 0.0,
        };
        for j in 0..i {
            if circle.contains(&points[j]) {
                continue;
            }
            circle = Circle::from_diameter(&points[i], &points[j]);
            for k in 0..j {
                if !circle.contains(&points[k]) {
                    circle = Circle::from_three(&points[i], &points[j], &points[k]);
                }
            }
        }
    }

    Some(circle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_and_single() {
        assert!(min_enclosing_circle(&[]).is_none());
        let c = min_enclosing_circle(&[Point::new(3.0, 4.0)]).unwrap();
        assert_eq!(c.center, Point::new(3.0, 4.0));
        assert_eq!(c.radius, 0.0);
    }

    #[test]
    fn two_points_use_diameter() {
        let c = min_enclosing_circle(&[Point::new(0.0, 0.0), Point::new(6.0, 8.0)]).unwrap();
        assert_relative_eq!(c.center.x, 3.0);
        assert_relative_eq!(c.center.y, 4.0);
        assert_relative_eq!(c.radius, 5.0);
    }

    #[test]
    fn square_corners() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.center.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(c.center.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(c.radius, 8.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn interior_points_do_not_grow_circle() {
        let mut pts: Vec<Point> = (0..16)
            .map(|i| {
                let a = i as f64 / 16.0 * std::f64::consts::TAU;
                Point::new(20.0 + 7.0 * a.cos(), 30.0 + 7.0 * a.sin())
            })
            .collect();
        pts.push(Point::new(20.0, 30.0));
        pts.push(Point::new(22.0, 31.0));
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.radius, 7.0, epsilon = 1e-9);
        assert_relative_eq!(c.center.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(c.center.y, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_points() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(5.0, 0.0)];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(c.radius, 2.5);
        assert_relative_eq!(c.center.x, 2.5);
    }
}
