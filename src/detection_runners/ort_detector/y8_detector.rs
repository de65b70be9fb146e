use image::RgbImage;
use crate::common::{ChannelOrder, DetectionSet, ModelIoSpec, SourceImage};
use crate::data::{ConfigOrt, X};
use crate::detection_runners::gateway::InferenceGateway;
use crate::detection_runners::inference_process::{InferenceProcess, Thresholds};
use crate::detection_runners::ort_detector::decoder::Decoder;
use crate::detection_runners::ort_detector::image_ops;
use crate::error::DetectError;
use crate::{utils, Result};

/// YOLOv8-style detector: preprocessing, a model gateway and the output decoder.
///
/// The detector owns its gateway; wrap the gateway in
/// [`SharedGateway`](crate::detection_runners::SharedGateway) to share one
/// loaded model between detectors.
#[derive(Debug)]
pub struct Y8Detector<G> {
    gateway: G,
    io_spec: ModelIoSpec,
    decoder: Decoder,
    thresholds: Thresholds,
    names: Vec<String>,
    channel_order: ChannelOrder,
    profile: bool,
}

impl<G: InferenceGateway> Y8Detector<G> {
    /// Builds a detector around `gateway`, taking decoding options from `config`.
    ///
    /// Class names come from `config.names`, then `config.labels_path`, then
    /// the model's own metadata.
    pub fn new(gateway: G, config: &ConfigOrt) -> Result<Self> {
        let io_spec = gateway.io_spec();

        let names = match (&config.names, &config.labels_path) {
            (Some(names), _) => names.clone(),
            (None, Some(path)) => utils::file_to_vec(path)?,
            (None, None) => gateway.class_names().unwrap_or_default(),
        };

        let model_nc = io_spec.num_classes();
        if let (Some(nc), Some(model_nc)) = (config.nc, model_nc) {
            if nc != model_nc {
                return Err(DetectError::shape_mismatch(
                    format!("[1, {}, N]", 4 + nc),
                    &io_spec.output_shape,
                ));
            }
        }
        let nc = config.nc.or(model_nc);
        if let Some(nc) = nc {
            if !names.is_empty() && names.len() != nc {
                log::warn!("{} class names given but the model outputs {} classes", names.len(), nc);
            }
        }

        log::info!(
            "Detector input {}x{} | classes: {:?} | conf: {} | iou: {} | nms: {:?}",
            io_spec.input_width(),
            io_spec.input_height(),
            nc,
            config.conf,
            config.iou,
            config.nms_mode,
        );

        Ok(Self {
            gateway,
            io_spec,
            decoder: Decoder::new().with_nc(nc).with_nms_mode(config.nms_mode),
            thresholds: Thresholds::new(config.conf, config.iou),
            names,
            channel_order: config.channel_order,
            profile: config.profile,
        })
    }

    /// Detects objects in `image`. Boxes are fractions of the image size.
    pub fn predict(&mut self, image: &SourceImage, conf_threshold: f32, iou_threshold: f32) -> Result<DetectionSet> {
        let thresh = Thresholds::new(conf_threshold, iou_threshold);
        let profile = self.profile;
        self.forward(image, thresh, profile)
    }

    /// [`Y8Detector::predict`] with the configured thresholds.
    pub fn predict_default(&mut self, image: &SourceImage) -> Result<DetectionSet> {
        let thresh = self.thresholds;
        self.predict(image, thresh.conf, thresh.iou)
    }

    /// Runs [`Y8Detector::predict`] on a raw 8-bit buffer laid out in the configured channel order.
    pub fn predict_rgb8(&mut self, image: RgbImage, conf_threshold: f32, iou_threshold: f32) -> Result<DetectionSet> {
        let source = SourceImage::new(image, self.channel_order);
        self.predict(&source, conf_threshold, iou_threshold)
    }

    /// Class name for `class_id`, or `"# {id}"` when the taxonomy is unknown.
    pub fn label(&self, class_id: usize) -> String {
        self.names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("# {}", class_id))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn io_spec(&self) -> &ModelIoSpec {
        &self.io_spec
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }
}

impl<G: InferenceGateway> InferenceProcess for Y8Detector<G> {
    type Input = SourceImage;
    type Output = DetectionSet;

    fn preprocess(&self, x: &Self::Input) -> Result<X> {
        image_ops::preprocess(x, self.io_spec.input_width(), self.io_spec.input_height())
    }

    fn inference(&mut self, x: X) -> Result<Vec<X>> {
        self.gateway.infer(&x)
    }

    fn postprocess(&self, ys: Vec<X>, thresh: Thresholds) -> Result<Self::Output> {
        if ys.len() != 1 {
            return Err(DetectError::ShapeMismatch {
                expected: "exactly one output tensor".to_string(),
                actual: format!("{} output tensors", ys.len()),
            });
        }
        self.decoder.decode(
            &ys[0].view_dyn(),
            self.io_spec.input_width(),
            self.io_spec.input_height(),
            thresh.conf,
            thresh.iou,
        )
    }
}
