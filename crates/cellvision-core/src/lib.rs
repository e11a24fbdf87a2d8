pub mod color;
pub mod consts;
pub mod detection;
pub mod error;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod source;
pub mod telemetry;
pub mod video;
