pub mod levels;
pub mod median;
