use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(
        "Frame is {actual_width}x{actual_height}x{actual_channels}, configured for {expected_width}x{expected_height}x{expected_channels}"
    )]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        expected_channels: usize,
        actual_width: usize,
        actual_height: usize,
        actual_channels: usize,
    },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Unsupported color mode: {0}")]
    UnsupportedColorMode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Publishing error: {0}")]
    Publish(String),

    #[error("{0} thread panicked")]
    ThreadPanic(&'static str),
}

pub type Result<T> = std::result::Result<T, VisionError>;
