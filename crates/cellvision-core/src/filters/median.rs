use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Per-channel median filter with a square `ksize` aperture.
///
/// Out-of-bounds samples replicate the nearest edge pixel. `ksize` must be
/// odd; `ksize <= 1` copies the input unchanged. Rows are filtered in
/// parallel for large frames.
pub fn median_blur_into(input: &Array3<u8>, ksize: usize, out: &mut Array3<u8>) {
    debug_assert_eq!(input.dim(), out.dim());
    if ksize <= 1 {
        out.assign(input);
        return;
    }

    let (h, w, _) = input.dim();
    let view = input.view();
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<u8>> = (0..h)
            .into_par_iter()
            .map(|row| median_row(&view, row, ksize))
            .collect();
        for (row, values) in rows.into_iter().enumerate() {
            write_row(out, row, values);
        }
    } else {
        for row in 0..h {
            write_row(out, row, median_row(&view, row, ksize));
        }
    }
}

/// Filtered values of one row, interleaved as `[col][channel]`.
fn median_row(input: &ArrayView3<u8>, row: usize, ksize: usize) -> Vec<u8> {
    let (h, w, channels) = input.dim();
    let half = (ksize / 2) as isize;
    let mut window = Vec::with_capacity(ksize * ksize);
    let mut values = Vec::with_capacity(w * channels);

    for col in 0..w {
        for c in 0..channels {
            window.clear();
            for dr in -half..=half {
                let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
                for dc in -half..=half {
                    let cc = (col as isize + dc).clamp(0, w as isize - 1) as usize;
                    window.push(input[[r, cc, c]]);
                }
            }
            let mid = window.len() / 2;
            let (_, median, _) = window.select_nth_unstable(mid);
            values.push(*median);
        }
    }
    values
}

fn write_row(out: &mut Array3<u8>, row: usize, values: Vec<u8>) {
    for (dst, v) in out.index_axis_mut(Axis(0), row).iter_mut().zip(values) {
        *dst = v;
    }
}
