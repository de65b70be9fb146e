mod det_box;
mod detection;
mod detection_set;
mod inference_device;
mod model_io_spec;
mod source_image;

pub use det_box::*;
pub use detection::*;
pub use detection_set::*;
pub use inference_device::*;
pub use model_io_spec::*;
pub use source_image::*;
