use ndarray::{Array3, Axis, Zip};

use crate::consts::{COLOR_CHANNEL_COUNT, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Frame;

/// Convert one RGB pixel to 8-bit HSV.
///
/// Hue is stored halved so it fits a byte: H in [0, 180), S and V in [0, 255].
/// Rounding is half-up, matching the integer conversion used by common
/// vision toolkits so thresholds tuned there carry over unchanged.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        (255.0 * diff as f64 / v as f64 + 0.5).floor() as i32
    };

    let h = if diff == 0 {
        0
    } else {
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let mut h = (30.0 * sector as f64 / diff as f64 + 0.5).floor() as i32;
        if h < 0 {
            h += 180;
        }
        h
    };

    [h as u8, s as u8, v as u8]
}

/// Gamma-remap `frame` through `lut` and convert it to HSV, writing into `out`.
///
/// `out` must already have the frame's shape.
pub fn remap_to_hsv_into(frame: &Frame, lut: &[u8; 256], out: &mut Array3<u8>) {
    debug_assert_eq!(out.dim(), frame.data.dim());
    let convert = |mut dst: ndarray::ArrayViewMut1<u8>, src: ndarray::ArrayView1<u8>| {
        let hsv = rgb_to_hsv([
            lut[src[0] as usize],
            lut[src[1] as usize],
            lut[src[2] as usize],
        ]);
        for c in 0..COLOR_CHANNEL_COUNT {
            dst[c] = hsv[c];
        }
    };

    let zip = Zip::from(out.lanes_mut(Axis(2))).and(frame.data.lanes(Axis(2)));
    if frame.width() * frame.height() >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(convert);
    } else {
        zip.for_each(convert);
    }
}

/// Allocating variant of [`remap_to_hsv_into`].
pub fn remap_to_hsv(frame: &Frame, lut: &[u8; 256]) -> Array3<u8> {
    let mut out = Array3::<u8>::zeros(frame.data.dim());
    remap_to_hsv_into(frame, lut, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
    }

    #[test]
    fn grey_has_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn yellow_lands_in_cell_hue_band() {
        // Pure yellow is 60 degrees, stored as 30.
        assert_eq!(rgb_to_hsv([255, 255, 0]), [30, 255, 255]);
        let [h, s, _] = rgb_to_hsv([230, 200, 20]);
        assert!((9..=34).contains(&h), "hue {h}");
        assert!(s >= 95, "saturation {s}");
    }

    #[test]
    fn negative_sector_wraps() {
        // Magenta-red: max is red, blue > green.
        let [h, _, _] = rgb_to_hsv([255, 0, 128]);
        assert!(h > 150 && h < 180, "hue {h}");
    }
}
