pub mod array;
pub mod constants;
pub mod detectors;
pub mod fragrec_errors;
pub mod geometry;
pub mod particle;
pub mod reconstruction;
pub mod telescope;
