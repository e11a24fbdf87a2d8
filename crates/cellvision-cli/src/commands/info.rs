use std::path::PathBuf;

use anyhow::{Context, Result};
use cellvision_core::io::ser::SerReader;
use cellvision_core::pipeline::FrameSize;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = SerReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let info = reader.source_info(&args.file);

    println!("File:        {}", info.filename.display());
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);
    println!("Color mode:  {:?}", info.color_mode);

    if info.total_frames > 0 {
        let first = reader.read_frame(0).ok().and_then(|f| f.metadata.timestamp_us);
        let last = reader
            .read_frame(info.total_frames - 1)
            .ok()
            .and_then(|f| f.metadata.timestamp_us);
        match (first, last) {
            (Some(a), Some(b)) if b > a && info.total_frames > 1 => {
                let fps = (info.total_frames - 1) as f64 / ((b - a) as f64 / 1e6);
                println!("Frame rate:  {fps:.1} fps");
            }
            _ => println!("Timestamps:  none"),
        }
    }

    let default_size = FrameSize::default();
    if info.width as usize != default_size.width || info.height as usize != default_size.height {
        println!(
            "Note:        default frame size is {}x{}; set [frame] in the config to match",
            default_size.width, default_size.height
        );
    }

    Ok(())
}
