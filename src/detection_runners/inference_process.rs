use std::time::Instant;
use crate::data::X;
use crate::utils;
use crate::Result;

/// Thresholds applied while decoding one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub conf: f32,
    pub iou: f32,
}

impl Thresholds {
    pub fn new(conf: f32, iou: f32) -> Self {
        Self { conf, iou }
    }
}

/// The three-stage detection pipeline. Stages run strictly in sequence.
pub trait InferenceProcess {
    type Input;
    type Output;

    /// Pre-process the input data.
    fn preprocess(&self, x: &Self::Input) -> Result<X>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, x: X) -> Result<Vec<X>>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: Vec<X>, thresh: Thresholds) -> Result<Self::Output>;

    /// Executes the full pipeline.
    fn run(&mut self, x: &Self::Input, thresh: Thresholds) -> Result<Self::Output> {
        let ys = self.preprocess(x)?;
        let ys = self.inference(ys)?;
        self.postprocess(ys, thresh)
    }

    /// Executes the full pipeline, tracing the time spent in each stage.
    fn forward(&mut self, x: &Self::Input, thresh: Thresholds, profile: bool) -> Result<Self::Output> {
        let detect_time = Instant::now();
        let mut _detect_elapsed = detect_time.elapsed();

        let ys = self.preprocess(x)?;
        let t_pre = detect_time.elapsed();
        _detect_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let ys = self.inference(ys)?;
        _detect_elapsed = utils::trace("TIME", "Detection run", detect_time, _detect_elapsed);
        let t_exe = _detect_elapsed - t_pre;

        let ys = self.postprocess(ys, thresh)?;
        let t_post = detect_time.elapsed() - _detect_elapsed;
        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);

        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(ys)
    }
}
