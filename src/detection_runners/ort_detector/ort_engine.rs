//! ONNX Runtime backend.

use std::time::Instant;
use half::{bf16, f16};
use ndarray::{Array, ArrayViewD, IxDyn};
use regex::Regex;
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Tensor, ValueType},
};
use crate::common::{InferenceDevice, ModelIoSpec};
use crate::data::{ConfigOrt, TimeCalc, X, CROSS_MARK};
use crate::detection_runners::gateway::InferenceGateway;
use crate::error::DetectError;
use crate::Result;

/// Names, element types and dims of a model's inputs or outputs.
/// Dynamic dims are recorded as `0`.
#[derive(Debug, Clone, Default)]
pub struct OrtTensorAttr {
    pub names: Vec<String>,
    pub dtypes: Vec<TensorElementType>,
    pub dimss: Vec<Vec<usize>>,
}

#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    inputs_attrs: OrtTensorAttr,
    outputs_attrs: OrtTensorAttr,
    io_spec: ModelIoSpec,
    profile: bool,
    pub infer_time: TimeCalc,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if !config.ort_lib_path.is_empty() {
            match ort::init_from(&config.ort_lib_path).commit() {
                Ok(_) => {}
                Err(e) => {
                    log::error!("{CROSS_MARK} ORT commit failed: {:?}", e);
                    return Err(e.into());
                }
            }
        }

        let mut builder = Session::builder()?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(
                    &mut builder,
                    device_id,
                    config.trt_fp16_enable,
                    config.trt_engine_cache_enable,
                ).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let inputs_attrs = Self::io_attrs(session.inputs.iter().map(|i| (&i.name, &i.input_type)));
        let outputs_attrs = Self::io_attrs(session.outputs.iter().map(|o| (&o.name, &o.output_type)));
        let io_spec = Self::build_io_spec(&inputs_attrs, &outputs_attrs, config)?;

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {:?} | Output: {:?}",
            device,
            io_spec.input_shape,
            io_spec.output_shape,
        );

        Ok(Self {
            session,
            device,
            inputs_attrs,
            outputs_attrs,
            io_spec,
            profile: config.profile,
            infer_time: TimeCalc::default(),
        })
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<(), String> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache");
        match trt.is_available() {
            Ok(true) => {}
            _ => return Err(format!("{CROSS_MARK} TensorRT execution provider not available")),
        }
        trt.register(builder)
            .map_err(|err| format!("{CROSS_MARK} TensorRT initialization failed: {:?}", err))?;
        log::info!("Initial model serialization with TensorRT may take some time...");
        Ok(())
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<(), String> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        match ep.is_available() {
            Ok(true) => {}
            _ => return Err(format!("{CROSS_MARK} CUDA execution provider not available")),
        }
        ep.register(builder)
            .map_err(|err| format!("{CROSS_MARK} CUDA initialization failed: {:?}", err))
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            if let Err(err) = ep.register(builder) {
                log::warn!("{CROSS_MARK} CPU initialization failed: {:?}, using ORT defaults", err);
            }
        } else {
            log::warn!("{CROSS_MARK} CPU execution provider reported unavailable, using ORT defaults");
        }
        Ok(())
    }

    fn io_attrs<'a>(values: impl Iterator<Item = (&'a String, &'a ValueType)>) -> OrtTensorAttr {
        let mut attrs = OrtTensorAttr::default();
        for (name, value_type) in values {
            if let ValueType::Tensor { ty, shape, .. } = value_type {
                attrs.names.push(name.to_string());
                attrs.dtypes.push(*ty);
                attrs.dimss.push(shape.iter().map(|&d| if d < 0 { 0 } else { d as usize }).collect());
            }
        }
        attrs
    }

    fn build_io_spec(inputs: &OrtTensorAttr, outputs: &OrtTensorAttr, config: &ConfigOrt) -> Result<ModelIoSpec> {
        let in_dims = inputs.dimss.first().map(Vec::as_slice).unwrap_or(&[]);
        if in_dims.len() != 4 {
            return Err(DetectError::shape_mismatch("input [batch, channels, height, width]", in_dims));
        }
        let out_dims = outputs.dimss.first().map(Vec::as_slice).unwrap_or(&[]);
        if out_dims.len() != 3 {
            return Err(DetectError::shape_mismatch("output [batch, 4 + nc, N]", out_dims));
        }

        let or = |d: usize, fallback: usize| if d == 0 { fallback } else { d };
        let input_shape = [
            or(in_dims[0], 1),
            or(in_dims[1], 3),
            or(in_dims[2], config.model_height as usize),
            or(in_dims[3], config.model_width as usize),
        ];
        let output_shape = [or(out_dims[0], 1), out_dims[1], out_dims[2]];

        Ok(ModelIoSpec::new(input_shape, output_shape))
    }

    fn tensor_preprocess(x: &X, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Tensor::from_array(x.0.clone())?.into_dyn(),
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Tensor::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            TensorElementType::Float64 => Tensor::from_array(x.mapv(|x_| x_ as f64))?.into_dyn(),
            TensorElementType::Uint8 => Tensor::from_array(x.mapv(|x_| (x_ * 255.).round() as u8))?.into_dyn(),
            other => return Err(DetectError::UnsupportedType(format!("{:?}", other))),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue) -> Result<Array<f32, IxDyn>>
        where
            T: AsF32 + ort::tensor::PrimitiveTensorElementType,
        {
            let view = x.try_extract_array::<T>()?;
            Ok(widen(view))
        }
        match dtype {
            TensorElementType::Float32 => _extract_and_convert::<f32>(x),
            TensorElementType::Float16 => _extract_and_convert::<f16>(x),
            TensorElementType::Bfloat16 => _extract_and_convert::<bf16>(x),
            TensorElementType::Float64 => _extract_and_convert::<f64>(x),
            TensorElementType::Int8 => _extract_and_convert::<i8>(x),
            TensorElementType::Uint8 => _extract_and_convert::<u8>(x),
            TensorElementType::Int32 => _extract_and_convert::<i32>(x),
            TensorElementType::Int64 => _extract_and_convert::<i64>(x),
            other => Err(DetectError::UnsupportedType(format!("{:?}", other))),
        }
    }

    pub fn engine_run(&mut self, x: &X) -> Result<Vec<X>> {
        let t_pre = Instant::now();
        let dtype = self.inputs_attrs.dtypes.first().copied().unwrap_or(TensorElementType::Float32);
        let xs_: Vec<SessionInputValue<'_>> = vec![Self::tensor_preprocess(x, &dtype)?.into()];
        self.infer_time.add_i(0, t_pre.elapsed());

        let t_run = Instant::now();
        let outputs = self.session.run(&xs_[..])?;
        self.infer_time.add_i(1, t_run.elapsed());

        let t_post = Instant::now();
        let mut ys = Vec::with_capacity(self.outputs_attrs.names.len());
        for (dtype, name) in self.outputs_attrs.dtypes.iter().zip(self.outputs_attrs.names.iter()) {
            let y = Self::tensor_postprocess(&outputs[name.as_str()], dtype)?;
            ys.push(X::from(y));
        }
        self.infer_time.add_i(2, t_post.elapsed());
        self.infer_time.tick();

        if self.profile {
            log::info!(
                "[Profile] to_tensor: {:?} | inference: {:?} ({:?} avg) | to_f32: {:?}",
                self.infer_time.avg_i(0),
                t_run.elapsed(),
                self.infer_time.avg_i(1),
                self.infer_time.avg_i(2),
            );
        }
        Ok(ys)
    }

    /// Reads a custom metadata entry of the model, e.g. `names`.
    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).ok().flatten(),
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn in_names(&self) -> &Vec<String> {
        &self.inputs_attrs.names
    }

    pub fn out_names(&self) -> &Vec<String> {
        &self.outputs_attrs.names
    }

    pub fn ts(&self) -> &TimeCalc {
        &self.infer_time
    }
}

impl InferenceGateway for OrtEngine {
    fn io_spec(&self) -> ModelIoSpec {
        self.io_spec
    }

    fn infer(&mut self, input: &X) -> Result<Vec<X>> {
        self.engine_run(input)
    }

    fn class_names(&self) -> Option<Vec<String>> {
        self.try_fetch("names").map(|names| parse_names(&names))
    }
}

/// Output element types the engine widens to `f32`.
trait AsF32: Copy + 'static {
    fn as_f32(self) -> f32;
}

macro_rules! as_f32_cast {
    ($($t:ty),*) => {
        $(impl AsF32 for $t {
            fn as_f32(self) -> f32 {
                self as f32
            }
        })*
    };
}

as_f32_cast!(f32, f64, i8, u8, i32, i64);

impl AsF32 for f16 {
    fn as_f32(self) -> f32 {
        self.to_f32()
    }
}

impl AsF32 for bf16 {
    fn as_f32(self) -> f32 {
        self.to_f32()
    }
}

fn widen<T: AsF32>(view: ArrayViewD<'_, T>) -> Array<f32, IxDyn> {
    view.mapv(T::as_f32)
}

/// Parses an Ultralytics `names` entry: `{0: 'person', 1: 'bicycle', ...}`.
pub(crate) fn parse_names(names: &str) -> Vec<String> {
    let re = match Regex::new(r#"(['"])([-()\w '"]+?)(['"])\s*[,}]"#) {
        Ok(re) => re,
        Err(_) => return vec![],
    };
    re.captures_iter(names)
        .map(|c| c[2].to_string())
        .collect()
}
