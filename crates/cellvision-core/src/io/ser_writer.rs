use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::io::ser::{SerHeader, SER_FRAME_COUNT_OFFSET, SER_HEADER_SIZE, SER_MAGIC};

/// Streams frames into a SER file whose length is not known up front.
///
/// The header frame count is patched on [`SerWriter::finalize`].
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frames_written: u32,
}

impl SerWriter {
    /// Create a new SER file and write the header.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frames_written: 0,
        })
    }

    pub fn header(&self) -> &SerHeader {
        &self.header
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Write a single raw frame (bytes must match the header's frame_byte_size).
    pub fn write_raw_frame(&mut self, data: &[u8]) -> Result<()> {
        debug_assert!(self.header.frame_byte_size().is_ok_and(|n| n == data.len()));
        self.writer.write_all(data)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Patch the frame count and flush.
    pub fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.seek(SeekFrom::Start(SER_FRAME_COUNT_OFFSET))?;
        file.write_all(&(self.frames_written as i32).to_le_bytes())?;
        file.seek(SeekFrom::End(0))?;
        file.flush()?;
        Ok(())
    }
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    w.write_all(SER_MAGIC)?;
    // LuID
    w.write_all(&0i32.to_le_bytes())?;
    w.write_all(&header.color_id.to_le_bytes())?;
    // 0 = little-endian, the convention readers expect in practice
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    w.write_all(&(header.width as i32).to_le_bytes())?;
    w.write_all(&(header.height as i32).to_le_bytes())?;
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_all(&header.date_time.to_le_bytes())?;
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(
        14 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 40 + 40 + 40 + 8 + 8,
        SER_HEADER_SIZE
    );
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let to_write = bytes.len().min(len);
    w.write_all(&bytes[..to_write])?;
    for _ in to_write..len {
        w.write_all(&[0u8])?;
    }
    Ok(())
}
