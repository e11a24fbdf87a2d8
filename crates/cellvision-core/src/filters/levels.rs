use ndarray::Zip;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Frame;

/// Build the 8-bit lookup table for `output = 255 * (input / 255)^gamma`.
///
/// gamma > 1.0 darkens midtones, gamma < 1.0 brightens them. Entries are
/// rounded to the nearest integer, so gamma = 1.0 is an exact identity.
pub fn gamma_lut(gamma: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let normalized = i as f64 / 255.0;
        *entry = (255.0 * normalized.powf(gamma)).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Apply gamma correction to every channel of a frame.
pub fn gamma_correct(frame: &Frame, gamma: f64) -> Frame {
    let lut = gamma_lut(gamma);
    let mut data = frame.data.clone();
    if frame.width() * frame.height() >= PARALLEL_PIXEL_THRESHOLD {
        Zip::from(&mut data).par_for_each(|v| *v = lut[*v as usize]);
    } else {
        data.mapv_inplace(|v| lut[v as usize]);
    }
    Frame {
        data,
        metadata: frame.metadata.clone(),
    }
}
