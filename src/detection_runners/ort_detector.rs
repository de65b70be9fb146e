mod ort_engine;
mod y8_detector;
pub mod decoder;
pub mod image_ops;
pub mod input_wrapper;
pub mod nms;

pub use decoder::Decoder;
pub use image_ops::preprocess;
pub use nms::{nms, Nms, NmsMode};
pub use ort_engine::*;
pub use y8_detector::*;
