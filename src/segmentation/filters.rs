//! Gaussian smoothing and rectangular morphology shared by the steps.

use crate::config::KernelSize;
use image::{GrayImage, Luma};
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::{grayscale_close, grayscale_dilate, grayscale_erode, Mask};

/// Binomial weights used for the small windows
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1D Gaussian weights for an odd `size`.
///
/// Sizes up to 7 use fixed binomial tables. Larger windows derive sigma from
/// the size: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    if size % 2 == 1 && size <= 7 {
        return SMALL_KERNELS[(size / 2) as usize].to_vec();
    }
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let weights: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian blur with a `size` x `size` window
pub fn gaussian_blur(image: &GrayImage, size: u32) -> GrayImage {
    separable_filter_equal(image, &gaussian_kernel(size))
}

/// All-ones structuring element anchored at its center
pub fn rect_mask(kernel: KernelSize) -> Mask {
    let element = GrayImage::from_pixel(kernel.width, kernel.height, Luma([255u8]));
    Mask::from_image(&element, (kernel.width / 2) as u8, (kernel.height / 2) as u8)
}

pub fn dilate(image: &GrayImage, kernel: KernelSize) -> GrayImage {
    grayscale_dilate(image, &rect_mask(kernel))
}

pub fn erode(image: &GrayImage, kernel: KernelSize) -> GrayImage {
    grayscale_erode(image, &rect_mask(kernel))
}

/// Dilation followed by erosion
pub fn close(image: &GrayImage, kernel: KernelSize) -> GrayImage {
    grayscale_close(image, &rect_mask(kernel))
}
