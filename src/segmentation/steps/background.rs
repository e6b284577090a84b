use crate::config::SegmentationParams;
use crate::segmentation::filters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::morphology::grayscale_dilate;

/// Suppress uneven illumination channel by channel.
///
/// The background of each channel is estimated by a max filter followed by a
/// Gaussian blur; the output is `255 - |channel - background|`, which leaves a
/// bright flat page with dark strokes.
pub fn apply(image: &RgbImage, params: &SegmentationParams) -> RgbImage {
    let (width, height) = image.dimensions();
    let mask = filters::rect_mask(params.background_kernel);

    let planes: Vec<GrayImage> = (0..3)
        .map(|channel| {
            let plane = GrayImage::from_fn(width, height, |x, y| {
                Luma([image.get_pixel(x, y).0[channel]])
            });
            let background =
                filters::gaussian_blur(&grayscale_dilate(&plane, &mask), params.background_blur);
            GrayImage::from_fn(width, height, |x, y| {
                let original = plane.get_pixel(x, y).0[0];
                let estimate = background.get_pixel(x, y).0[0];
                Luma([255 - original.abs_diff(estimate)])
            })
        })
        .collect();

    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            planes[0].get_pixel(x, y).0[0],
            planes[1].get_pixel(x, y).0[0],
            planes[2].get_pixel(x, y).0[0],
        ])
    })
}
