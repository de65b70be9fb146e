//! Turns the raw `[1, 4 + nc, N]` YOLOv8 head output into grouped detections.

use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use rayon::prelude::*;
use crate::common::{DetBox, Detection, DetectionSet};
use crate::detection_runners::ort_detector::nms::{nms, Nms, NmsMode};
use crate::error::DetectError;
use crate::Result;

/// One row of the transposed output that passed the confidence filter.
/// `bbox` is still in model input pixels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: DetBox,
}

impl Nms for Candidate {
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

#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    nc: Option<usize>,
    nms_mode: NmsMode,
}

impl Decoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fixes the taxonomy size. The output must then have exactly `4 + nc` channels.
    pub fn with_nc(mut self, nc: Option<usize>) -> Self {
        self.nc = nc;
        self
    }

    pub fn with_nms_mode(mut self, mode: NmsMode) -> Self {
        self.nms_mode = mode;
        self
    }

    pub fn nc(&self) -> Option<usize> {
        self.nc
    }

    pub fn nms_mode(&self) -> NmsMode {
        self.nms_mode
    }

    /// Decodes one raw output tensor.
    ///
    /// Candidates whose best class score is not strictly above
    /// `conf_threshold` are dropped, the rest go through greedy suppression
    /// and come out with boxes divided by `input_width`/`input_height`.
    /// A zero input dimension is rejected with [`DetectError::InvalidInput`].
    pub fn decode(
        &self,
        raw: &ArrayViewD<'_, f32>,
        input_width: u32,
        input_height: u32,
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Result<DetectionSet> {
        if input_width == 0 || input_height == 0 {
            return Err(DetectError::InvalidInput { width: input_width, height: input_height });
        }
        let preds = self.check_shape(raw)?;
        let n = preds.len_of(Axis(1));

        let mut candidates = Self::extract(preds, conf_threshold);
        log::debug!("{} of {} candidates above conf {}", candidates.len(), n, conf_threshold);

        nms(&mut candidates, iou_threshold, self.nms_mode);
        log::debug!("{} candidates survived nms (iou {})", candidates.len(), iou_threshold);

        let (w, h) = (input_width as f32, input_height as f32);
        Ok(candidates
            .into_iter()
            .map(|c| Detection::new(c.class_id, c.confidence, c.bbox.normalized(w, h)))
            .collect())
    }

    /// Runs greedy suppression over already decoded detections, e.g. to merge
    /// results from several frames. Survivors come back in descending confidence.
    pub fn suppress(&self, mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
        nms(&mut detections, iou_threshold, self.nms_mode);
        detections
    }

    /// Validates `[1, C, N]` and returns the `[C, N]` plane.
    fn check_shape<'a>(&self, raw: &ArrayViewD<'a, f32>) -> Result<ArrayView2<'a, f32>> {
        let shape = raw.shape();
        let expected_c = match self.nc {
            Some(nc) => format!("{}", 4 + nc),
            None => "4 + nc".to_string(),
        };
        let expected = format!("[1, {}, N]", expected_c);

        if shape.len() != 3 || shape[0] != 1 {
            return Err(DetectError::shape_mismatch(expected, shape));
        }
        let (c, n) = (shape[1], shape[2]);
        let channels_ok = match self.nc {
            Some(nc) => c == 4 + nc && nc > 0,
            None => c > 4,
        };
        if !channels_ok {
            return Err(DetectError::shape_mismatch(expected, shape));
        }
        if n == 0 {
            return Err(DetectError::EmptyOutput);
        }

        let plane = raw.clone().index_axis_move(Axis(0), 0).into_dimensionality::<Ix2>()?;
        Ok(plane)
    }

    /// Class selection, confidence filter and center-to-corner conversion.
    /// Candidate order is preserved.
    fn extract(preds: ArrayView2<'_, f32>, conf_threshold: f32) -> Vec<Candidate> {
        // [C, N] -> [N, C], one row per candidate
        let rows = preds.reversed_axes();

        rows.axis_iter(Axis(0))
            .into_par_iter()
            .filter_map(|row| {
                let (class_id, confidence) = best_class(row.iter().skip(4).copied())?;
                if !(confidence > conf_threshold) {
                    return None;
                }
                let bbox = DetBox::default().with_cxcy_wh(row[0], row[1], row[2], row[3]);
                Some(Candidate {
                    class_id,
                    confidence,
                    bbox,
                })
            })
            .collect()
    }
}

/// Index and value of the first maximum score. NaN scores never win.
fn best_class(scores: impl Iterator<Item = f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, s) in scores.enumerate() {
        match best {
            Some((_, b)) if !(s > b) => {}
            _ if s.is_nan() => {}
            _ => best = Some((i, s)),
        }
    }
    best
}
