use thiserror::Error;

/// Errors raised by the detection pipeline.
///
/// `InvalidInput`, `ShapeMismatch` and `EmptyOutput` are the contract
/// violations of the pipeline itself; the remaining variants carry errors
/// from the collaborators (ONNX Runtime, resizer, ndarray).
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("invalid input image dimensions: {width}x{height}")]
    InvalidInput { width: u32, height: u32 },

    #[error("model output shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("model output contains no candidates")]
    EmptyOutput,

    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("image resize failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported tensor element type: {0}")]
    UnsupportedType(String),
}

impl DetectError {
    pub fn shape_mismatch(expected: impl Into<String>, actual: &[usize]) -> Self {
        DetectError::ShapeMismatch {
            expected: expected.into(),
            actual: format!("{:?}", actual),
        }
    }
}
