/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Value written into a mask or canvas for a set pixel.
pub const MASK_SET: u8 = 255;

/// Value of a clear mask or canvas pixel.
pub const MASK_CLEAR: u8 = 0;

/// Default processing frame width. Matches the 160x120 stream of the robot camera.
pub const DEFAULT_FRAME_WIDTH: usize = 160;

/// Default processing frame height.
pub const DEFAULT_FRAME_HEIGHT: usize = 120;

/// Default gamma exponent (identity remap).
pub const DEFAULT_GAMMA: f64 = 1.0;

/// Default lower HSV bound for the yellow power cell.
///
/// Hue uses the 8-bit convention of [0, 180). The bounds are the tuned
/// floating thresholds (8.09, 94.02, 0.0) rounded up to the next integer.
pub const DEFAULT_HSV_LOWER: [u8; 3] = [9, 95, 0];

/// Default upper HSV bound. Tuned value 34.10 rounded down.
pub const DEFAULT_HSV_UPPER: [u8; 3] = [34, 255, 255];

/// Default square kernel size for morphological opening.
pub const DEFAULT_KERNEL_SIZE: i32 = 5;

/// Default median blur kernel. 0 disables the blur.
pub const DEFAULT_MEDIAN_BLUR: usize = 0;

/// Default lower admissible enclosing-circle radius (exclusive), in pixels.
pub const DEFAULT_MIN_RADIUS: f64 = 4.0;

/// Default upper admissible enclosing-circle radius (exclusive), in pixels.
pub const DEFAULT_MAX_RADIUS: f64 = 60.0;

/// Ramer-Douglas-Peucker tolerance for contour simplification, in pixels.
pub const DEFAULT_POLYGON_EPSILON: f64 = 1.0;

/// Real-world diameter of a power cell, in inches.
pub const DEFAULT_OBJECT_DIAMETER: f64 = 7.0;

/// Effective focal length in pixels for the default 160x120 stream.
pub const DEFAULT_FOCAL_LENGTH: f64 = 170.0;

/// Default telemetry table name.
pub const DEFAULT_TELEMETRY_TABLE: &str = "visionTable";

/// Default telemetry key for the horizontal bearing.
pub const DEFAULT_KEY_HORIZONTAL_ANGLE: &str = "CellVisionAngle";

/// Default telemetry key for the vertical bearing.
pub const DEFAULT_KEY_VERTICAL_ANGLE: &str = "CellVisionVerticalAngle";

/// Default telemetry key for the distance estimate.
pub const DEFAULT_KEY_DISTANCE: &str = "CellVisionDistance";

/// Default telemetry key for the selected candidate radius.
pub const DEFAULT_KEY_RADIUS: &str = "CellVisionRadius";

/// Relative tolerance used when testing whether a point lies inside a circle.
pub const ENCLOSING_CIRCLE_EPSILON: f64 = 1e-7;
