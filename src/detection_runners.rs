pub mod gateway;
pub mod inference_process;
pub mod ort_detector;

pub use gateway::{InferenceGateway, SharedGateway};
pub use inference_process::{InferenceProcess, Thresholds};
pub use ort_detector::*;
