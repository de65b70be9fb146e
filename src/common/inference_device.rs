/// Execution provider the ONNX Runtime session is built for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
}

impl InferenceDevice {
    pub fn from_str(device: &str, device_id: usize) -> Option<Self> {
        match device.trim().to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" | "gpu" => Some(InferenceDevice::CUDA(device_id)),
            "tensorrt" | "trt" => Some(InferenceDevice::TensorRT(device_id)),
            _ => None,
        }
    }

    /// Parses `cpu`, `cuda`, `cuda:1`, `tensorrt:0` and the like.
    /// A missing device id means device 0.
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.split_once(':') {
            Some((name, id)) => Self::from_str(name, id.trim().parse().ok()?),
            None => Self::from_str(spec, 0),
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => "CPU",
            InferenceDevice::CUDA(_) => "CUDA",
            InferenceDevice::TensorRT(_) => "TensorRT",
        }
    }

    pub fn device_id(&self) -> Option<usize> {
        match self {
            InferenceDevice::CPU => None,
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) => Some(*id),
        }
    }

    pub fn is_gpu(&self) -> bool {
        !matches!(self, InferenceDevice::CPU)
    }

    pub fn is_valid_inference_device(inference_device: &str) -> bool {
        InferenceDevice::parse(inference_device).is_some()
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.device_id() {
            Some(id) => write!(f, "{}:{}", self.str(), id),
            None => write!(f, "{}", self.str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_device_specs() {
        assert_eq!(InferenceDevice::parse("cpu"), Some(InferenceDevice::CPU));
        assert_eq!(InferenceDevice::parse("CUDA"), Some(InferenceDevice::CUDA(0)));
        assert_eq!(InferenceDevice::parse("gpu:2"), Some(InferenceDevice::CUDA(2)));
        assert_eq!(InferenceDevice::parse("tensorrt:1"), Some(InferenceDevice::TensorRT(1)));
        assert_eq!(InferenceDevice::parse("cuda:x"), None);
        assert!(!InferenceDevice::is_valid_inference_device("tpu"));
    }

    #[test]
    fn display_round_trips() {
        for device in [InferenceDevice::CPU, InferenceDevice::CUDA(3), InferenceDevice::TensorRT(0)] {
            assert_eq!(InferenceDevice::parse(&device.to_string()), Some(device));
        }
    }
}
