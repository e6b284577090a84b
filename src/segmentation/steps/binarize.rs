use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Binary mask together with the threshold that produced it
#[derive(Debug, Clone)]
pub struct Binarized {
    pub mask: GrayImage,
    pub level: u8,
}

/// Grayscale conversion followed by a global Otsu split.
/// Pixels above the level become 255, everything else 0.
pub fn apply(image: &RgbImage) -> Binarized {
    let gray = to_luma(image);
    let level = otsu_level(&gray);
    let mask = threshold(&gray, level, ThresholdType::Binary);
    Binarized { mask, level }
}

/// BT.601 luma (0.299 R + 0.587 G + 0.114 B), rounded to nearest
pub fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}
