mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod error;

use std::time::Instant;
use anyhow::Context;
use image::RgbImage;
use crate::common::{DetectionSet, SourceImage};
use crate::data::ConfigOrt;
use crate::detection_runners::{OrtEngine, Y8Detector};

pub use crate::error::DetectError;

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Loads the model described by `config` on ONNX Runtime and warms it up.
pub fn init_detector(config: &ConfigOrt) -> anyhow::Result<Y8Detector<OrtEngine>> {
    log::info!("Initializing ORT session with ({}) execution provider", config.device);
    let engine = OrtEngine::new(config)
        .with_context(|| format!("Failed to load model {}", config.onnx_path))?;
    let mut detector = Y8Detector::new(engine, config)?;

    let spec = *detector.io_spec();
    let blank = SourceImage::from(RgbImage::new(spec.input_width(), spec.input_height()));
    for i in 0..config.num_dry_run {
        let now = Instant::now();
        detector
            .predict(&blank, config.conf, config.iou)
            .with_context(|| format!("Warm-up run {} failed", i + 1))?;
        log::debug!("Warm-up run {} took {:?}", i + 1, now.elapsed());
    }

    Ok(detector)
}

/// Runs one image through `detector` with the thresholds it was configured with.
pub fn run_detection(detector: &mut Y8Detector<OrtEngine>, image: &SourceImage) -> anyhow::Result<DetectionSet> {
    let now = Instant::now();

    let detections = detector.predict_default(image)?;

    log::debug!("Processing time: {:?} | {} detections", now.elapsed(), detections.len());

    Ok(detections)
}
