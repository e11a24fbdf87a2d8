use ndarray::{Array3, Axis, Zip};

use crate::consts::{MASK_CLEAR, MASK_SET, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Mask;

/// True if every channel lies within its inclusive `[lower, upper]` range.
#[inline]
pub fn in_range(pixel: [u8; 3], lower: [u8; 3], upper: [u8; 3]) -> bool {
    (0..3).all(|c| lower[c] <= pixel[c] && pixel[c] <= upper[c])
}

/// Mark every pixel of `hsv` whose channels all fall inside the bounds.
///
/// `mask` must have the spatial shape of `hsv`.
pub fn in_range_into(hsv: &Array3<u8>, lower: [u8; 3], upper: [u8; 3], mask: &mut Mask) {
    let (h, w, _) = hsv.dim();
    debug_assert_eq!(mask.dim(), (h, w));

    let classify = |m: &mut u8, px: ndarray::ArrayView1<u8>| {
        *m = if in_range([px[0], px[1], px[2]], lower, upper) {
            MASK_SET
        } else {
            MASK_CLEAR
        };
    };

    let zip = Zip::from(mask).and(hsv.lanes(Axis(2)));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(classify);
    } else {
        zip.for_each(classify);
    }
}

/// Allocating variant of [`in_range_into`].
pub fn in_range_mask(hsv: &Array3<u8>, lower: [u8; 3], upper: [u8; 3]) -> Mask {
    let (h, w, _) = hsv.dim();
    let mut mask = Mask::zeros((h, w));
    in_range_into(hsv, lower, upper, &mut mask);
    mask
}
