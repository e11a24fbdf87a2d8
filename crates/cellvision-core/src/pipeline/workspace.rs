//! Per-pass scratch buffers.
//!
//! Buffers are allocated once for the configured frame size and cleared at the
//! start of every pass, so nothing from one frame leaks into the next.
use ndarray::Array3;

use crate::consts::{COLOR_CHANNEL_COUNT, MASK_CLEAR};
use crate::frame::Mask;

use super::config::FrameSize;

pub struct Workspace {
    pub(crate) hsv: Array3<u8>,
    pub(crate) blurred: Array3<u8>,
    pub(crate) mask: Mask,
    pub(crate) eroded: Mask,
    pub(crate) cleaned: Mask,
    pub(crate) canvas: Mask,
}

impl Workspace {
    pub fn new(size: FrameSize) -> Self {
        let (h, w) = (size.height, size.width);
        Self {
            hsv: Array3::zeros((h, w, COLOR_CHANNEL_COUNT)),
            blurred: Array3::zeros((h, w, COLOR_CHANNEL_COUNT)),
            mask: Mask::zeros((h, w)),
            eroded: Mask::zeros((h, w)),
            cleaned: Mask::zeros((h, w)),
            canvas: Mask::zeros((h, w)),
        }
    }

    /// Clear every buffer.
    pub fn reset(&mut self) {
        self.hsv.fill(0);
        self.blurred.fill(0);
        self.mask.fill(MASK_CLEAR);
        self.eroded.fill(MASK_CLEAR);
        self.cleaned.fill(MASK_CLEAR);
        self.canvas.fill(MASK_CLEAR);
    }
}
