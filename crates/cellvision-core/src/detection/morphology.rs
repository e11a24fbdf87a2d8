use crate::consts::{MASK_CLEAR, MASK_SET};
use crate::frame::Mask;

/// Morphological opening (erosion followed by dilation) with a square
/// `kernel_size` x `kernel_size` structuring element anchored at `kernel_size / 2`.
///
/// Removes foreground specks smaller than the kernel while preserving larger
/// regions. Pixels outside the image never erode a region and never grow one.
/// A kernel of size 1 or less (including non-positive values) copies the input.
pub fn morphological_opening(mask: &Mask, kernel_size: i32) -> Mask {
    let mut scratch = Mask::zeros(mask.dim());
    let mut out = Mask::zeros(mask.dim());
    morphological_opening_into(mask, kernel_size, &mut scratch, &mut out);
    out
}

/// Opening that writes into caller-owned buffers. `scratch` holds the eroded mask.
pub fn morphological_opening_into(mask: &Mask, kernel_size: i32, scratch: &mut Mask, out: &mut Mask) {
    debug_assert_eq!(mask.dim(), out.dim());
    if kernel_size <= 1 {
        out.assign(mask);
        return;
    }
    let k = kernel_size as isize;
    let anchor = k / 2;

    // Erosion window covers [-anchor, k-1-anchor]; dilation uses its reflection.
    erode_into(mask, -anchor, k - 1 - anchor, scratch);
    dilate_into(scratch, -(k - 1 - anchor), anchor, out);
}

/// A pixel stays set only if every in-bounds pixel of its window is set.
fn erode_into(mask: &Mask, lo: isize, hi: isize, out: &mut Mask) {
    let (h, w) = mask.dim();
    for row in 0..h {
        for col in 0..w {
            if mask[[row, col]] == MASK_CLEAR {
                out[[row, col]] = MASK_CLEAR;
                continue;
            }
            let all_set = window(row, col, lo, hi, h, w).all(|(r, c)| mask[[r, c]] != MASK_CLEAR);
            out[[row, col]] = if all_set { MASK_SET } else { MASK_CLEAR };
        }
    }
}

/// A pixel becomes set if any in-bounds pixel of its window is set.
fn dilate_into(mask: &Mask, lo: isize, hi: isize, out: &mut Mask) {
    let (h, w) = mask.dim();
    for row in 0..h {
        for col in 0..w {
            let any_set = window(row, col, lo, hi, h, w).any(|(r, c)| mask[[r, c]] != MASK_CLEAR);
            out[[row, col]] = if any_set { MASK_SET } else { MASK_CLEAR };
        }
    }
}

/// In-bounds coordinates of the window `[row+lo, row+hi] x [col+lo, col+hi]`.
fn window(
    row: usize,
    col: usize,
    lo: isize,
    hi: isize,
    h: usize,
    w: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let r0 = (row as isize + lo).max(0) as usize;
    let r1 = (row as isize + hi).min(h as isize - 1) as usize;
    let c0 = (col as isize + lo).max(0) as usize;
    let c1 = (col as isize + hi).min(w as isize - 1) as usize;
    (r0..=r1).flat_map(move |r| (c0..=c1).map(move |c| (r, c)))
}
