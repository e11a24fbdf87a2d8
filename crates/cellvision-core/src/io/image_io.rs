use std::path::Path;

use image::{GrayImage, ImageFormat, RgbImage};
use ndarray::Array3;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{Result, VisionError};
use crate::frame::{Frame, Mask};

/// Load any image the `image` crate decodes as an 8-bit RGB frame.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let img = image::open(path)?.to_rgb8();
    let (w, h) = img.dimensions();
    let data = Array3::from_shape_vec((h as usize, w as usize, COLOR_CHANNEL_COUNT), img.into_raw())
        .map_err(|_| VisionError::InvalidDimensions {
            width: w,
            height: h,
        })?;
    Ok(Frame::new(data))
}

/// Save an RGB frame as 8-bit PNG.
pub fn save_frame_png(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w, _) = frame.data.dim();
    let pixels: Vec<u8> = frame.data.iter().copied().collect();
    let img = RgbImage::from_raw(w as u32, h as u32, pixels).ok_or(
        VisionError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a mask or annotation canvas as 8-bit grayscale PNG.
pub fn save_mask_png(mask: &Mask, path: &Path) -> Result<()> {
    let (h, w) = mask.dim();
    let pixels: Vec<u8> = mask.iter().copied().collect();
    let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or(
        VisionError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        },
    )?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
