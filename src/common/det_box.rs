use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as top-left corner plus extent.
///
/// The same type is used for input-pixel boxes and for boxes normalized to
/// `[0, 1]` fractions of the model input; which space a value is in depends
/// on where it came from. No clamping is ever applied, so `left`/`top` may be
/// negative and the box may extend past the frame.
#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DetBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DetBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a corner box from a center-based `(cx, cy, w, h)` box.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.left = cx - w / 2.;
        self.top = cy - h / 2.;
        self.width = w;
        self.height = h;
        self
    }

    /// Returns the maximum x-coordinate of the bounding box.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Returns the maximum y-coordinate of the bounding box.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn cx(&self) -> f32 {
        self.left + self.width / 2.
    }

    pub fn cy(&self) -> f32 {
        self.top + self.height / 2.
    }

    /// Returns the bounding box coordinates and size as `(x, y, w, h)`.
    pub fn xy1_wh(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.width, self.height)
    }

    /// Computes the area of the bounding box.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &DetBox) -> f32 {
        let left = self.left.max(other.left);
        let right = self.right().min(other.right());
        let top = self.top.max(other.top);
        let bottom = self.bottom().min(other.bottom());
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &DetBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Intersection over union. Degenerate pairs with no union area overlap by 0.
    pub fn iou(&self, other: &DetBox) -> f32 {
        let union = self.union(other);
        if union <= 0. {
            return 0.;
        }
        self.intersect(other) / union
    }

    /// Divides the horizontal fields by `width` and the vertical ones by `height`.
    pub fn normalized(&self, width: f32, height: f32) -> Self {
        Self {
            left: self.left / width,
            top: self.top / height,
            width: self.width / width,
            height: self.height / height,
        }
    }

    /// Inverse of [`DetBox::normalized`], e.g. to map a result onto the original image.
    pub fn denormalized(&self, width: f32, height: f32) -> Self {
        Self {
            left: self.left * width,
            top: self.top * height,
            width: self.width * width,
            height: self.height * height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_to_corner() {
        let b = DetBox::default().with_cxcy_wh(60., 60., 100., 100.);
        assert_eq!(b.xy1_wh(), (10., 10., 100., 100.));
        assert_eq!(b.cx(), 60.);
    }

    #[test]
    fn corner_may_go_negative() {
        let b = DetBox::default().with_cxcy_wh(5., 5., 20., 30.);
        assert_eq!(b.left, -5.);
        assert_eq!(b.top, -10.);
    }

    #[test]
    fn overlap_of_shifted_boxes() {
        let a = DetBox::new(10., 10., 100., 100.);
        let b = DetBox::new(15., 15., 100., 100.);
        assert_eq!(a.intersect(&b), 95. * 95.);
        let iou = a.iou(&b);
        assert!((iou - 9025. / 10975.).abs() < 1e-6);
    }

    #[test]
    fn disjoint_and_degenerate() {
        let a = DetBox::new(0., 0., 10., 10.);
        let b = DetBox::new(20., 20., 10., 10.);
        assert_eq!(a.iou(&b), 0.);

        let empty = DetBox::new(3., 3., 0., 0.);
        assert_eq!(empty.iou(&empty), 0.);
    }

    #[test]
    fn normalize_then_denormalize() {
        let b = DetBox::new(-12.5, 40., 320., 100.);
        let n = b.normalized(640., 480.);
        assert_eq!(n.left, -12.5 / 640.);
        assert_eq!(n.height, 100. / 480.);
        let back = n.denormalized(640., 480.);
        assert!((back.left - b.left).abs() < 1e-4);
        assert!((back.width - b.width).abs() < 1e-4);
    }
}
