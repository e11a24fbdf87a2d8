//! Display sinks for the annotated canvas.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::{Result, VisionError};
use crate::frame::Mask;
use crate::io::image_io::save_mask_png;
use crate::io::ser::SerHeader;
use crate::io::ser_writer::SerWriter;

/// Receives one annotated canvas per processed frame.
pub trait VideoSink: Send {
    fn put_frame(&mut self, canvas: &Mask) -> Result<()>;

    /// Flush buffered output once the stream ends.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards every frame.
#[derive(Debug, Default)]
pub struct NullVideoSink;

impl VideoSink for NullVideoSink {
    fn put_frame(&mut self, _canvas: &Mask) -> Result<()> {
        Ok(())
    }
}

/// Keeps a copy of the most recent canvas, readable from other threads.
#[derive(Debug, Default, Clone)]
pub struct LatestFrameSink {
    latest: Arc<Mutex<Option<Mask>>>,
    count: Arc<Mutex<usize>>,
}

impl LatestFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Mask> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn frames_received(&self) -> usize {
        *self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VideoSink for LatestFrameSink {
    fn put_frame(&mut self, canvas: &Mask) -> Result<()> {
        let mut slot = self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_mut() {
            Some(existing) if existing.dim() == canvas.dim() => existing.assign(canvas),
            _ => *slot = Some(canvas.clone()),
        }
        *self.count.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}

/// Records canvases as an 8-bit mono SER video.
pub struct SerVideoSink {
    writer: SerWriter,
    buffer: Vec<u8>,
}

impl SerVideoSink {
    pub fn create(path: &Path, width: usize, height: usize) -> Result<Self> {
        let header = SerHeader::mono8(width as u32, height as u32);
        let writer = SerWriter::create(path, &header)?;
        info!(path = %path.display(), width, height, "Recording annotated video");
        Ok(Self {
            writer,
            buffer: Vec::with_capacity(width * height),
        })
    }
}

impl VideoSink for SerVideoSink {
    fn put_frame(&mut self, canvas: &Mask) -> Result<()> {
        let header = self.writer.header();
        let (h, w) = canvas.dim();
        if w != header.width as usize || h != header.height as usize {
            return Err(VisionError::Publish(format!(
                "canvas {}x{} does not match video {}x{}",
                w, h, header.width, header.height
            )));
        }
        self.buffer.clear();
        self.buffer.extend(canvas.iter().copied());
        self.writer.write_raw_frame(&self.buffer)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.finalize()?;
        info!(frames = self.writer.frames_written(), "Annotated video finalized");
        Ok(())
    }
}

/// Writes each canvas as `frame_000123.png` into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    next_index: usize,
}

impl PngSequenceSink {
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            next_index: 0,
        })
    }
}

impl VideoSink for PngSequenceSink {
    fn put_frame(&mut self, canvas: &Mask) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.next_index));
        save_mask_png(canvas, &path)?;
        self.next_index += 1;
        Ok(())
    }
}

/// Pick a sink from an output path: `.ser` records video, anything else is a PNG directory.
pub fn open_video_sink(path: &Path, width: usize, height: usize) -> Result<Box<dyn VideoSink>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ser") => Ok(Box::new(SerVideoSink::create(path, width, height)?)),
        _ => Ok(Box::new(PngSequenceSink::create(path)?)),
    }
}
