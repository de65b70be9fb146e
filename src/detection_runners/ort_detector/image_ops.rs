//! Functions to preprocess images.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use ndarray::Array;
use crate::common::{ChannelOrder, SourceImage};
use crate::detection_runners::input_wrapper::X;
use crate::error::DetectError;
use crate::Result;

/// Turns `image` into the `[1, 3, target_h, target_w]` RGB tensor the model expects.
///
/// The image is stretched to the target size with bilinear interpolation
/// (no letterbox padding, so aspect ratio is not preserved) and every value
/// is scaled by `1 / 255`. Each output pixel blends only the 2x2 source
/// pixels around its sample point, also when downscaling.
pub fn preprocess(image: &SourceImage, target_w: u32, target_h: u32) -> Result<X> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidInput { width, height });
    }
    if target_w == 0 || target_h == 0 {
        return Err(DetectError::InvalidInput { width: target_w, height: target_h });
    }

    let src = FirImage::from_vec_u8(width, height, image.as_raw().clone(), PixelType::U8x3)?;
    let mut resizer = Resizer::new();
    let resized = resize_image(&src, target_w, target_h, &mut resizer)?;

    let flat = nchw_normalize_flat(&resized, image.channel_order)?;
    let tensor = Array::from_shape_vec(
        (1, 3, target_h as usize, target_w as usize),
        flat,
    )?.into_dyn();

    Ok(X::from(tensor))
}

fn resize_image<'a>(
    img: &FirImage,
    target_w: u32,
    target_h: u32,
    resizer: &mut Resizer,
) -> Result<FirImage<'a>> {
    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Interpolation(FilterType::Bilinear));

    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);
    resizer.resize(img, &mut dst, &options)?;
    Ok(dst)
}

fn nchw_normalize_flat(img: &FirImage, order: ChannelOrder) -> Result<Vec<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        return Err(DetectError::shape_mismatch(
            format!("{} interleaved bytes", w * h * 3),
            &[buf.len()],
        ));
    }

    let mut out = vec![0.0f32; buf.len()];
    let hw = w * h;
    let [r_off, g_off, b_off] = order.rgb_offsets();

    for i in 0..hw {
        let px = &buf[3 * i..3 * i + 3];
        out[i] = px[r_off] as f32 / 255.0;
        out[i + hw] = px[g_off] as f32 / 255.0;
        out[i + 2 * hw] = px[b_off] as f32 / 255.0;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn rejects_empty_image() {
        let img = SourceImage::from(RgbImage::new(0, 10));
        match preprocess(&img, 32, 32) {
            Err(DetectError::InvalidInput { width, height }) => {
                assert_eq!((width, height), (0, 10));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    // resampling a flat colour may shift a channel by one step
    const TOL: f32 = 1.5 / 255.;

    #[test]
    fn planar_layout_and_scale() {
        let img = SourceImage::from(RgbImage::from_pixel(8, 4, Rgb([255, 0, 51])));
        let x = preprocess(&img, 6, 3).unwrap();
        assert_eq!(x.shape(), &[1, 3, 3, 6]);
        for v in x.index_axis(ndarray::Axis(1), 0).iter() {
            assert!((v - 1.0).abs() < TOL);
        }
        for v in x.index_axis(ndarray::Axis(1), 1).iter() {
            assert!(v.abs() < TOL);
        }
        for v in x.index_axis(ndarray::Axis(1), 2).iter() {
            assert!((v - 0.2).abs() < TOL);
        }
    }

    #[test]
    fn bgr_is_reordered() {
        let img = SourceImage::from(RgbImage::from_pixel(4, 4, Rgb([10, 20, 255])))
            .with_channel_order(ChannelOrder::Bgr);
        let x = preprocess(&img, 4, 4).unwrap();
        assert!((x[[0, 0, 0, 0]] - 1.0).abs() < TOL);
        assert!((x[[0, 2, 0, 0]] - 10. / 255.).abs() < TOL);
    }

    #[test]
    fn anisotropic_resize() {
        let img = SourceImage::from(RgbImage::from_pixel(100, 20, Rgb([1, 2, 3])));
        let x = preprocess(&img, 16, 16).unwrap();
        assert_eq!(x.shape(), &[1, 3, 16, 16]);
    }

    #[test]
    fn downscale_samples_two_by_two_neighbourhood() {
        // 64 -> 16 samples source x = 4 * dx + 1.5, between two dark columns
        let img = RgbImage::from_fn(64, 4, |x, _| {
            if x % 4 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        let x = preprocess(&SourceImage::from(img), 16, 4).unwrap();
        for v in x.iter() {
            assert_eq!(*v, 0.0);
        }
    }
}
