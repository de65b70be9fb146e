/// Anything greedy suppression can rank and compare.
pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> usize;
}

/// Which candidates are allowed to suppress each other.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NmsMode {
    /// Every kept box suppresses overlapping boxes of any class.
    #[default] ClassAgnostic,
    /// A kept box only suppresses overlapping boxes of its own class.
    PerClass,
}

/// Greedy non-maximum suppression, in place.
///
/// Boxes are stable-sorted by descending confidence, so equal confidences keep
/// their incoming order. A box is dropped when its IoU with an already kept
/// box is strictly greater than `iou_threshold`. Survivors are left in
/// descending confidence order.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32, mode: NmsMode) {
    boxes.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));

    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            if mode == NmsMode::PerClass && boxes[prev_index].class_id() != boxes[index].class_id() {
                continue;
            }
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}
