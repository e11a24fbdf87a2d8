#![allow(dead_code)]

use cellvision_core::frame::{Frame, Mask};
use cellvision_core::io::ser::SER_HEADER_SIZE;
use cellvision_core::pipeline::PipelineConfig;
use cellvision_core::source::disc_frame;

/// Disc color that falls inside the default HSV bounds.
pub const CELL_COLOR: [u8; 3] = [230, 200, 20];
/// Background color outside the default HSV bounds.
pub const BACKGROUND: [u8; 3] = [30, 60, 90];

pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 120;

/// Default-sized frame with a cell-colored disc.
pub fn cell_frame(cx: f64, cy: f64, radius: f64) -> Frame {
    disc_frame(WIDTH, HEIGHT, (cx, cy), radius, CELL_COLOR, BACKGROUND)
}

/// Default-sized frame with only background.
pub fn blank_frame() -> Frame {
    Frame::filled(WIDTH, HEIGHT, BACKGROUND)
}

pub fn default_config() -> PipelineConfig {
    PipelineConfig::default()
}

/// Build a mask from rows of `#` (set) and `.` (clear).
pub fn mask_from(rows: &[&str]) -> Mask {
    let h = rows.len();
    let w = rows.first().map_or(0, |r| r.len());
    let mut mask = Mask::zeros((h, w));
    for (r, line) in rows.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            if ch == '#' {
                mask[[r, c]] = 255;
            }
        }
    }
    mask
}

pub fn count_set(mask: &Mask) -> usize {
    mask.iter().filter(|&&v| v != 0).count()
}

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8..=11 Bayer (unsupported), 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer (40 bytes)
    let mut observer = [0u8; 40];
    observer[..4].copy_from_slice(b"Team");
    buf.extend_from_slice(&observer);
    // Instrument (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // Telescope (40 bytes)
    buf.extend_from_slice(&[0u8; 40]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete SER file from raw frame buffers.
pub fn build_ser(width: u32, height: u32, color_id: i32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header_full(width, height, 8, frames.len(), color_id);
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Interleaved RGB bytes of a frame, optionally in BGR order.
pub fn frame_bytes(frame: &Frame, bgr: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.data.len());
    for row in 0..frame.height() {
        for col in 0..frame.width() {
            let [r, g, b] = frame.pixel(row, col);
            if bgr {
                out.extend_from_slice(&[b, g, r]);
            } else {
                out.extend_from_slice(&[r, g, b]);
            }
        }
    }
    out
}

/// Write a SER buffer to a temporary file.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".ser")
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}
