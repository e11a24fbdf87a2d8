//! Frame acquisition.
use std::path::{Path, PathBuf};

use ndarray::Array3;
use tracing::info;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::Result;
use crate::frame::Frame;
use crate::io::image_io::load_frame;
use crate::io::ser::SerReader;

/// Produces frames in capture order. `Ok(None)` marks the end of the stream.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Number of frames still to come, if finite and known.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Replays a SER recording.
pub struct SerSource {
    reader: SerReader,
    next: usize,
    replay_loop: bool,
    emitted: usize,
}

impl SerSource {
    pub fn open(path: &Path, replay_loop: bool) -> Result<Self> {
        let reader = SerReader::open(path)?;
        info!(
            path = %path.display(),
            frames = reader.frame_count(),
            width = reader.header.width,
            height = reader.header.height,
            "Opened SER recording"
        );
        Ok(Self {
            reader,
            next: 0,
            replay_loop,
            emitted: 0,
        })
    }
}

impl FrameSource for SerSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.next >= self.reader.frame_count() {
            if !self.replay_loop || self.reader.frame_count() == 0 {
                return Ok(None);
            }
            self.next = 0;
        }
        let frame = self.reader.read_frame(self.next)?.with_index(self.emitted);
        self.next += 1;
        self.emitted += 1;
        Ok(Some(frame))
    }

    fn remaining(&self) -> Option<usize> {
        if self.replay_loop {
            None
        } else {
            Some(self.reader.frame_count().saturating_sub(self.next))
        }
    }
}

/// Decodes a list of still images in order.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, next: 0 }
    }

    /// All files in `dir` with a common image extension, sorted by name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
                    Some("png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff")
                )
            })
            .collect();
        paths.sort();
        Ok(Self::new(paths))
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        let frame = load_frame(path)?.with_index(self.next);
        self.next += 1;
        Ok(Some(frame))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.paths.len() - self.next)
    }
}

/// Renders a uniformly colored disc on a flat background.
///
/// A pixel belongs to the disc when its center lies within `radius` of `center`.
pub fn disc_frame(
    width: usize,
    height: usize,
    center: (f64, f64),
    radius: f64,
    color: [u8; 3],
    background: [u8; 3],
) -> Frame {
    let (cx, cy) = center;
    let data = Array3::from_shape_fn((height, width, COLOR_CHANNEL_COUNT), |(row, col, c)| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        if dx * dx + dy * dy <= radius * radius {
            color[c]
        } else {
            background[c]
        }
    });
    Frame::new(data)
}

/// Synthetic camera: a disc orbiting the frame center.
pub struct SyntheticSource {
    pub width: usize,
    pub height: usize,
    pub radius: f64,
    pub color: [u8; 3],
    pub background: [u8; 3],
    /// Total frames to emit; `None` runs forever.
    pub frames: Option<usize>,
    index: usize,
}

impl SyntheticSource {
    pub fn new(width: usize, height: usize, radius: f64, frames: Option<usize>) -> Self {
        Self {
            width,
            height,
            radius,
            color: [230, 200, 20],
            background: [30, 60, 90],
            frames,
            index: 0,
        }
    }

    /// Disc center for frame `index`.
    pub fn center_at(&self, index: usize) -> (f64, f64) {
        let orbit = (self.width.min(self.height) as f64 / 2.0 - self.radius - 2.0).max(0.0);
        let phase = index as f64 * std::f64::consts::TAU / 90.0;
        (
            (self.width as f64 / 2.0 + orbit * phase.cos()).round(),
            (self.height as f64 / 2.0 + orbit * phase.sin()).round(),
        )
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.frames.is_some_and(|n| self.index >= n) {
            return Ok(None);
        }
        let frame = disc_frame(
            self.width,
            self.height,
            self.center_at(self.index),
            self.radius,
            self.color,
            self.background,
        )
        .with_index(self.index);
        self.index += 1;
        Ok(Some(frame))
    }

    fn remaining(&self) -> Option<usize> {
        self.frames.map(|n| n.saturating_sub(self.index))
    }
}
