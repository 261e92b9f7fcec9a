pub mod annotate;
pub mod blob_detector;
pub mod calibration;
pub mod chunk;
pub mod color_classifier;
pub mod entity;
pub mod grid_manager;
pub mod monitor;
pub mod offside;
pub mod pixel;
pub mod possession;
pub mod smart_blob;
pub mod utils;
