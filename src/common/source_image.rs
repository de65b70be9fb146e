use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Byte order of the three interleaved channels in a [`SourceImage`] buffer.
///
/// The model consumes RGB planes. `Bgr` buffers (as produced by most camera
/// and OpenCV pipelines) are reordered during normalization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    #[default] Rgb,
    Bgr,
}

impl ChannelOrder {
    pub fn from_str(order: &str) -> Option<Self> {
        match order.to_lowercase().as_str() {
            "rgb" => Some(ChannelOrder::Rgb),
            "bgr" => Some(ChannelOrder::Bgr),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            ChannelOrder::Rgb => "RGB",
            ChannelOrder::Bgr => "BGR",
        }
    }

    /// Source byte offsets of the red, green and blue channels.
    pub(crate) fn rgb_offsets(&self) -> [usize; 3] {
        match self {
            ChannelOrder::Rgb => [0, 1, 2],
            ChannelOrder::Bgr => [2, 1, 0],
        }
    }
}

/// An interleaved 8-bit, 3-channel image handed to the preprocessor.
#[derive(Debug, Clone, Default)]
pub struct SourceImage {
    pub image: RgbImage,
    pub channel_order: ChannelOrder,
}

impl std::ops::Deref for SourceImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
            ..Default::default()
        }
    }
}

impl From<GrayImage> for SourceImage {
    fn from(image: GrayImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
            ..Default::default()
        }
    }
}

impl From<RgbImage> for SourceImage {
    fn from(image: RgbImage) -> Self {
        Self {
            image,
            ..Default::default()
        }
    }
}

impl From<RgbaImage> for SourceImage {
    fn from(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
            ..Default::default()
        }
    }
}

impl SourceImage {
    pub fn new(image: RgbImage, channel_order: ChannelOrder) -> Self {
        Self {
            image,
            channel_order,
        }
    }

    /// Wraps a raw interleaved buffer whose channels are laid out as `channel_order`.
    pub fn from_raw(width: u32, height: u32, buf: Vec<u8>, channel_order: ChannelOrder) -> Option<Self> {
        RgbImage::from_raw(width, height, buf).map(|image| Self::new(image, channel_order))
    }

    pub fn with_channel_order(mut self, channel_order: ChannelOrder) -> Self {
        self.channel_order = channel_order;
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_order_names() {
        for order in [ChannelOrder::Rgb, ChannelOrder::Bgr] {
            assert_eq!(ChannelOrder::from_str(order.str()), Some(order));
        }
        assert_eq!(ChannelOrder::from_str("bgr").map(|o| o.rgb_offsets()), Some([2, 1, 0]));
        assert_eq!(ChannelOrder::from_str("yuv"), None);
    }
}
