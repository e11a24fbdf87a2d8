//! Border following on binary masks.
//!
//! Implements the Suzuki-Abe topological border following algorithm with
//! 8-connectivity. Every outer border and every hole border is reported,
//! together with the index of its enclosing border, in raster discovery order.
use ndarray::Array2;

use crate::consts::MASK_CLEAR;
use crate::frame::Mask;

/// A point in pixel coordinates. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A closed boundary curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    /// Boundary pixels in traversal order, with collinear runs compressed
    /// to their end points.
    pub points: Vec<Point>,
    /// True for the border between a region and a hole inside it.
    pub is_hole: bool,
    /// Index of the immediately enclosing border, `None` at the top level.
    pub parent: Option<usize>,
}

/// Neighbor offsets as (d_row, d_col), in counter-clockwise order starting east.
const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const EAST: usize = 0;

type Pixel = (usize, usize);

/// Find all borders in `mask`. Any non-zero pixel counts as foreground.
pub fn find_contours(mask: &Mask) -> Vec<Contour> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    // One pixel of background padding so every neighbor lookup is in bounds.
    let mut labels = Array2::<i32>::zeros((h + 2, w + 2));
    for ((row, col), &v) in mask.indexed_iter() {
        if v != MASK_CLEAR {
            labels[[row + 1, col + 1]] = 1;
        }
    }

    let mut contours: Vec<Contour> = Vec::new();
    // Border number 1 is the image frame; contour k carries number k + 2.
    let mut nbd: i32 = 1;

    for i in 1..=h {
        let mut lnbd: i32 = 1;
        for j in 1..=w {
            let value = labels[[i, j]];
            if value == 0 {
                continue;
            }

            let start = if value == 1 && labels[[i, j - 1]] == 0 {
                Some((false, (i, j - 1)))
            } else if value >= 1 && labels[[i, j + 1]] == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((true, (i, j + 1)))
            } else {
                None
            };

            if let Some((is_hole, from)) = start {
                nbd += 1;
                let parent = border_parent(is_hole, lnbd, &contours);
                let chain = follow_border(&mut labels, (i, j), from, nbd);
                contours.push(Contour {
                    points: compress_chain(&chain),
                    is_hole,
                    parent,
                });
            }

            let value = labels[[i, j]];
            if value != 1 {
                lnbd = value.abs();
            }
        }
    }

    contours
}

/// Parent of a new border given the last border `lnbd` met on this row.
fn border_parent(is_hole: bool, lnbd: i32, contours: &[Contour]) -> Option<usize> {
    if lnbd <= 1 {
        return None;
    }
    let index = (lnbd - 2) as usize;
    let previous = &contours[index];
    if previous.is_hole == is_hole {
        previous.parent
    } else {
        Some(index)
    }
}

fn direction(from: Pixel, to: Pixel) -> usize {
    let d = (
        to.0 as isize - from.0 as isize,
        to.1 as isize - from.1 as isize,
    );
    DIRECTIONS
        .iter()
        .position(|&dir| dir == d)
        .unwrap_or(EAST)
}

fn step(p: Pixel, dir: usize) -> Pixel {
    let (dr, dc) = DIRECTIONS[dir];
    ((p.0 as isize + dr) as usize, (p.1 as isize + dc) as usize)
}

fn to_point(p: Pixel) -> Point {
    Point::new((p.1 - 1) as f64, (p.0 - 1) as f64)
}

/// Trace one border starting at `start`, entered from background pixel `from`.
/// Marks visited border pixels with `nbd` (or `-nbd` on the right edge of a run).
fn follow_border(labels: &mut Array2<i32>, start: Pixel, from: Pixel, nbd: i32) -> Vec<Point> {
    let from_dir = direction(start, from);
    let first = (0..8)
        .map(|k| step(start, (from_dir + 8 - k) % 8))
        .find(|&p| labels[[p.0, p.1]] != 0);

    let Some(p1) = first else {
        labels[[start.0, start.1]] = -nbd;
        return vec![to_point(start)];
    };

    let mut points = Vec::new();
    let mut p2 = p1;
    let mut p3 = start;
    loop {
        points.push(to_point(p3));

        let d2 = direction(p3, p2);
        let mut east_is_background = false;
        let mut p4 = p2;
        for k in 1..=8 {
            let d = (d2 + k) % 8;
            let q = step(p3, d);
            if labels[[q.0, q.1]] != 0 {
                p4 = q;
                break;
            }
            if d == EAST {
                east_is_background = true;
            }
        }

        if east_is_background {
            labels[[p3.0, p3.1]] = -nbd;
        } else if labels[[p3.0, p3.1]] == 1 {
            labels[[p3.0, p3.1]] = nbd;
        }

        if p4 == start && p3 == p1 {
            break;
        }
        p2 = p3;
        p3 = p4;
    }
    points
}

/// Drop points in the middle of straight horizontal, vertical or diagonal runs.
fn compress_chain(chain: &[Point]) -> Vec<Point> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }
    let delta = |a: &Point, b: &Point| (b.x - a.x, b.y - a.y);

    let mut out = Vec::with_capacity(n);
    for k in 0..n {
        let prev = &chain[(k + n - 1) % n];
        let next = &chain[(k + 1) % n];
        if k == 0 || delta(prev, &chain[k]) != delta(&chain[k], next) {
            out.push(chain[k]);
        }
    }
    out
}
