use super::contours::Point;

/// Simplify a closed curve with the Ramer-Douglas-Peucker algorithm.
///
/// The curve is split at the vertex farthest from the first point and each
/// half is simplified independently, so the result does not depend on a
/// degenerate zero-length chord between the start and end of the loop.
pub fn simplify_closed(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let far = (1..n)
        .max_by(|&a, &b| {
            points[0]
                .distance(&points[a])
                .total_cmp(&points[0].distance(&points[b]))
                .then(b.cmp(&a))
        })
        .unwrap_or(n / 2);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;
    mark_kept(points, 0, far, epsilon, &mut keep);

    // Second half wraps back to the start: simplify far..n plus point 0.
    let mut tail: Vec<Point> = points[far..].to_vec();
    tail.push(points[0]);
    let mut tail_keep = vec![false; tail.len()];
    mark_kept(&tail, 0, tail.len() - 1, epsilon, &mut tail_keep);
    for (offset, kept) in tail_keep.iter().enumerate().take(tail.len() - 1) {
        if *kept {
            keep[far + offset] = true;
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Mark the vertices of `points[first..=last]` that survive simplification.
fn mark_kept(points: &[Point], first: usize, last: usize, epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(first, last)];
    while let Some((a, b)) = stack.pop() {
        if b <= a + 1 {
            continue;
        }
        let mut max_dist = -1.0;
        let mut index = a;
        for (i, p) in points.iter().enumerate().take(b).skip(a + 1) {
            let d = line_distance(p, &points[a], &points[b]);
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > epsilon {
            keep[index] = true;
            stack.push((index, b));
            stack.push((a, index));
        }
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn line_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_square_corners() {
        let pts: Vec<Point> = [
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (10.0, 10.0),
            (5.0, 10.0),
            (0.0, 10.0),
            (0.0, 5.0),
        ]
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect();
        let simplified = simplify_closed(&pts, 0.5);
        assert_eq!(
            simplified,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ]
        );
    }

    #[test]
    fn short_curves_unchanged() {
        let pts = vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        assert_eq!(simplify_closed(&pts, 1.0), pts);
    }

    #[test]
    fn zero_epsilon_keeps_off_line_points() {
        let pts: Vec<Point> = (0..12)
            .map(|i| {
                let a = i as f64 / 12.0 * std::f64::consts::TAU;
                Point::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        assert_eq!(simplify_closed(&pts, 0.0).len(), 12);
    }
}
