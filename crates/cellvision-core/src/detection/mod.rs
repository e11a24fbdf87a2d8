pub mod candidate;
pub mod circle;
pub mod config;
pub mod contours;
pub mod morphology;
pub mod polygon;
pub mod threshold;

pub use candidate::{extract_candidates, is_admissible, select_candidate, Candidate};
pub use circle::{min_enclosing_circle, Circle};
pub use config::DetectionConfig;
pub use contours::{find_contours, Contour, Point};
