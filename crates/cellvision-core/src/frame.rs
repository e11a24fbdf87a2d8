use ndarray::{Array2, Array3};
use std::path::PathBuf;

use crate::consts::COLOR_CHANNEL_COUNT;

/// Single-channel binary image. Set pixels are `MASK_SET`, clear pixels `MASK_CLEAR`.
pub type Mask = Array2<u8>;

/// A single 8-bit RGB frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width, 3), channel order R, G, B.
    pub data: Array3<u8>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim().2, COLOR_CHANNEL_COUNT);
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// A frame filled with a single color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = Array3::from_shape_fn((height, width, COLOR_CHANNEL_COUNT), |(_, _, c)| rgb[c]);
        Self::new(data)
    }

    pub fn with_index(mut self, frame_index: usize) -> Self {
        self.metadata.frame_index = frame_index;
        self
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        [
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Color mode of a recorded source.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColorMode {
    Mono,
    RGB,
    BGR,
    /// Any other SER color id, such as a Bayer mosaic. Frames cannot be decoded.
    Unsupported(i32),
}

/// Metadata about a recorded source file.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
}
