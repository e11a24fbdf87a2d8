use crate::consts::MASK_SET;
use crate::detection::{Circle, Point};
use crate::frame::Mask;

/// Draw the closed polygon through `vertices` onto `canvas`.
pub fn draw_polygon(canvas: &mut Mask, vertices: &[Point]) {
    match vertices.len() {
        0 => {}
        1 => plot(canvas, vertices[0].x.round() as i64, vertices[0].y.round() as i64),
        n => {
            for k in 0..n {
                draw_line(canvas, &vertices[k], &vertices[(k + 1) % n]);
            }
        }
    }
}

/// Bresenham line between the rounded end points.
pub fn draw_line(canvas: &mut Mask, a: &Point, b: &Point) {
    let (mut x0, mut y0) = (a.x.round() as i64, a.y.round() as i64);
    let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(canvas, x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Midpoint circle outline, clipped to the canvas.
pub fn draw_circle(canvas: &mut Mask, circle: &Circle) {
    let cx = circle.center.x.round() as i64;
    let cy = circle.center.y.round() as i64;
    let r = circle.radius.round() as i64;
    if r <= 0 {
        plot(canvas, cx, cy);
        return;
    }

    let mut x = r;
    let mut y = 0;
    let mut err = 1 - r;
    while x >= y {
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            plot(canvas, cx + px, cy + py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

fn plot(canvas: &mut Mask, x: i64, y: i64) {
    let (h, w) = canvas.dim();
    if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
        canvas[[y as usize, x as usize]] = MASK_SET;
    }
}
