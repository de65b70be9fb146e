use serde::{Deserialize, Serialize};
use crate::common::DetBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// A single recognized object.
///
/// `bbox` is expressed as fractions of the model input width/height once it
/// leaves the decoder. `class_id` indexes the model's class taxonomy.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: DetBox,
}

impl Nms for Detection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn class_id(&self) -> usize {
        self.class_id
    }
}

impl Detection {
    pub fn new(class_id: usize, confidence: f32, bbox: DetBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }

    /// Maps the normalized box onto an image of `width` x `height` pixels.
    pub fn bbox_in(&self, width: u32, height: u32) -> DetBox {
        self.bbox.denormalized(width as f32, height as f32)
    }
}
