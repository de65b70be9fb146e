mod config_ort;
mod time_calc;

pub use config_ort::{ConfigOrt, DEFAULT_CONF_THRESHOLD, DEFAULT_IOU_THRESHOLD};
pub use time_calc::TimeCalc;

pub use crate::detection_runners::ort_detector::input_wrapper::X;
pub use crate::detection_runners::ort_detector::nms::NmsMode;

pub(crate) const CROSS_MARK: &str = "❌";
