//! Options for building a detector on top of ONNX Runtime.

use anyhow::Result;
use crate::common::{ChannelOrder, InferenceDevice};
use crate::detection_runners::ort_detector::nms::NmsMode;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.4;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: String,
    pub device: InferenceDevice,
    // only consulted when the model's input height/width are dynamic
    pub model_width: u32,
    pub model_height: u32,
    pub profile: bool,
    pub num_dry_run: usize,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,

    // decoding
    pub nc: Option<usize>,
    pub conf: f32,
    pub iou: f32,
    pub nms_mode: NmsMode,
    pub channel_order: ChannelOrder,
    pub names: Option<Vec<String>>,
    pub labels_path: Option<String>,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: String::new(),
            device: InferenceDevice::CPU,
            model_width: 640,
            model_height: 640,
            profile: false,
            num_dry_run: 1,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,

            nc: None,
            conf: DEFAULT_CONF_THRESHOLD,
            iou: DEFAULT_IOU_THRESHOLD,
            nms_mode: NmsMode::ClassAgnostic,
            channel_order: ChannelOrder::Rgb,
            names: None,
            labels_path: None,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Result<Self> {
        if !std::path::Path::new(onnx_path).exists() {
            anyhow::bail!("Model file not found: {}", onnx_path);
        }
        self.onnx_path = onnx_path.to_string();
        Ok(self)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Result<Self> {
        if !ort_lib_path.is_empty() && !std::path::Path::new(ort_lib_path).exists() {
            anyhow::bail!("ONNX Runtime library not found: {}", ort_lib_path);
        }
        self.ort_lib_path = ort_lib_path.to_string();
        Ok(self)
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }

    pub fn with_trt_engine_cache(mut self, x: bool) -> Self {
        self.trt_engine_cache_enable = x;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect::<Vec<String>>());
        self
    }

    pub fn with_labels_path(mut self, labels_path: &str) -> Self {
        self.labels_path = Some(labels_path.to_string());
        self
    }

    pub fn with_nc(mut self, nc: usize) -> Self {
        self.nc = Some(nc);
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = x;
        self
    }

    pub fn with_nms_mode(mut self, x: NmsMode) -> Self {
        self.nms_mode = x;
        self
    }

    pub fn with_channel_order(mut self, x: ChannelOrder) -> Self {
        self.channel_order = x;
        self
    }
}
