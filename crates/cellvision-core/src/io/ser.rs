use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{Result, VisionError};
use crate::frame::{ColorMode, Frame, FrameMetadata, SourceInfo};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Byte offset of the frame count field in the header.
pub(crate) const SER_FRAME_COUNT_OFFSET: u64 = 38;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for an 8-bit mono recording.
    pub fn mono8(width: u32, height: u32) -> Self {
        Self {
            color_id: 0,
            little_endian: true,
            width,
            height,
            pixel_depth: 8,
            frame_count: 0,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (3 for RGB/BGR, 1 otherwise).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame. Fails when the header's dimensions overflow.
    pub fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.bytes_per_pixel_plane()))
            .and_then(|n| n.checked_mul(self.planes_per_pixel()))
            .ok_or_else(|| {
                VisionError::InvalidSer(format!(
                    "Frame size overflows: {}x{} at {} bits",
                    self.width, self.height, self.pixel_depth
                ))
            })
    }

    /// Offset of the first byte after the last frame, where the timestamp trailer starts.
    pub fn data_end(&self) -> Result<usize> {
        self.frame_byte_size()?
            .checked_mul(self.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| {
                VisionError::InvalidSer(format!(
                    "Data size overflows: {} frames",
                    self.frame_count
                ))
            })
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            0 => ColorMode::Mono,
            100 => ColorMode::RGB,
            101 => ColorMode::BGR,
            other => ColorMode::Unsupported(other),
        }
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
    frame_size: usize,
    data_end: usize,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and recordings are not modified while replayed.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(VisionError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(VisionError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let frame_size = header.frame_byte_size()?;
        let data_end = header.data_end()?;
        if mmap.len() < data_end {
            return Err(VisionError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                data_end,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            header,
            frame_size,
            data_end,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Get the raw bytes for a single frame (zero-copy from mmap).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(VisionError::FrameIndexOutOfRange {
                index,
                total: count,
            });
        }
        // In bounds: `open` checked that every frame fits before `data_end`.
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        Ok(&self.mmap[offset..offset + self.frame_size])
    }

    /// Read a single frame as 8-bit RGB.
    ///
    /// Mono recordings are replicated into all three channels; deeper
    /// recordings are scaled down to 8 bits. Other color ids, Bayer mosaics included, are rejected.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let mode = self.header.color_mode();
        let channel_order: [usize; 3] = match mode {
            ColorMode::Mono | ColorMode::RGB => [0, 1, 2],
            ColorMode::BGR => [2, 1, 0],
            ColorMode::Unsupported(color_id) => {
                return Err(VisionError::UnsupportedColorMode(format!(
                    "SER color id {color_id}"
                )));
            }
        };

        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let bpp = self.header.bytes_per_pixel_plane();
        let planes = self.header.planes_per_pixel();
        let max_val = ((1u32 << self.header.pixel_depth.clamp(1, 16)) - 1) as f32;

        let mut data = Array3::<u8>::zeros((h, w, COLOR_CHANNEL_COUNT));
        for row in 0..h {
            for col in 0..w {
                let pixel_offset = (row * w + col) * planes * bpp;
                for (c, &plane) in channel_order.iter().enumerate() {
                    let plane = plane.min(planes - 1);
                    let idx = pixel_offset + plane * bpp;
                    data[[row, col, c]] = if bpp == 1 {
                        raw[idx]
                    } else {
                        let pair = [raw[idx], raw[idx + 1]];
                        let v = if self.header.little_endian {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        };
                        (v as f32 / max_val * 255.0).round().clamp(0.0, 255.0) as u8
                    };
                }
            }
        }

        Ok(Frame {
            data,
            metadata: FrameMetadata {
                frame_index: index,
                timestamp_us: self.read_timestamp(index),
            },
        })
    }

    /// Read per-frame timestamp from the optional trailer.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        let start = index.checked_mul(8)?.checked_add(self.data_end)?;
        let bytes = self.mmap.get(start..start.checked_add(8)?)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    /// Build SourceInfo from the header.
    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            filename: path.to_path_buf(),
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.header.pixel_depth as u8,
            color_mode: self.header.color_mode(),
        }
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(VisionError::InvalidDimensions { width, height });
    }

    // Most writers store 0 for little-endian data despite the format notes.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}
