use crate::config::SegmentationParams;
use crate::segmentation::filters;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};

const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Word candidates and the intermediate masks that produced them
#[derive(Debug, Clone)]
pub struct RegionDetection {
    pub eroded: GrayImage,
    pub dilated: GrayImage,
    pub closed: GrayImage,
    /// Binary mask with every external contour drawn on it
    pub overlay: RgbImage,
    pub contours: Vec<Contour<i32>>,
}

/// Merge strokes of the binary mask into word-sized blobs and trace them.
///
/// The merge element is wide and short so letters of a word fuse while
/// neighbouring lines stay apart.
pub fn detect(mask: &GrayImage, params: &SegmentationParams) -> RegionDetection {
    let blurred = filters::gaussian_blur(mask, params.region_blur);
    let threshed =
        adaptive_threshold_inv(&blurred, params.adaptive_block_size, params.adaptive_offset);

    let eroded = filters::erode(&threshed, params.erode_kernel);
    let dilated = filters::dilate(&eroded, params.merge_kernel);
    let closed = filters::close(&dilated, params.merge_kernel);

    let contours = external_contours(&closed);
    let overlay = draw_contours(mask, &contours);

    tracing::debug!("Region detection found {} external contours", contours.len());

    RegionDetection {
        eroded,
        dilated,
        closed,
        overlay,
        contours,
    }
}

/// Inverted adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes foreground (255) when it is at least `offset` darker than
/// its neighbourhood.
pub fn adaptive_threshold_inv(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let mean = filters::gaussian_blur(image, block_size);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y).0[0] as i32;
        let local = mean.get_pixel(x, y).0[0] as i32 - offset;
        if value <= local {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Outermost borders only; holes and anything nested inside them are dropped
pub fn external_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| !c.points.is_empty())
        .collect()
}

fn draw_contours(base: &GrayImage, contours: &[Contour<i32>]) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(base.clone()).to_rgb8();
    for contour in contours {
        for p in &contour.points {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < canvas.width() && (p.y as u32) < canvas.height()
            {
                canvas.put_pixel(p.x as u32, p.y as u32, CONTOUR_COLOR);
            }
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White page with black glyph bars grouped into words
    fn glyph_mask(width: u32, height: u32, words: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
        for &(wx, wy) in words {
            for glyph in 0..5 {
                let gx = wx + glyph * 10;
                for y in wy..wy + 24 {
                    for x in gx..gx + 6 {
                        mask.put_pixel(x, y, Luma([0]));
                    }
                }
            }
        }
        mask
    }

    #[test]
    fn test_blank_mask_has_no_contours() {
        let mask = GrayImage::from_pixel(80, 60, Luma([255]));
        let result = detect(&mask, &SegmentationParams::default());
        assert!(result.contours.is_empty());
        assert!(result.closed.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_letters_of_a_word_merge_into_one_blob() {
        let mask = glyph_mask(320, 80, &[(30, 30), (130, 30), (230, 30)]);
        let result = detect(&mask, &SegmentationParams::default());
        assert_eq!(result.contours.len(), 3);
    }

    #[test]
    fn test_separate_lines_stay_apart() {
        let mask = glyph_mask(120, 200, &[(30, 40), (30, 120)]);
        let result = detect(&mask, &SegmentationParams::default());
        assert_eq!(result.contours.len(), 2);
    }

    #[test]
    fn test_intermediates_match_input_size() {
        let mask = glyph_mask(120, 90, &[(20, 30)]);
        let result = detect(&mask, &SegmentationParams::default());
        assert_eq!(result.eroded.dimensions(), (120, 90));
        assert_eq!(result.dilated.dimensions(), (120, 90));
        assert_eq!(result.closed.dimensions(), (120, 90));
        assert_eq!(result.overlay.dimensions(), (120, 90));
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_detail() {
        let mut img = GrayImage::from_pixel(30, 30, Luma([200]));
        img.put_pixel(15, 15, Luma([20]));
        let result = adaptive_threshold_inv(&img, 11, 1);
        assert_eq!(result.get_pixel(15, 15).0[0], 255);
        assert_eq!(result.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn test_nested_blob_is_not_external() {
        let mut mask = GrayImage::new(40, 40);
        for y in 5..35 {
            for x in 5..35 {
                let on_ring = !(10..30).contains(&x) || !(10..30).contains(&y);
                let on_core = (15..25).contains(&x) && (15..25).contains(&y);
                if on_ring || on_core {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        assert_eq!(external_contours(&mask).len(), 1);
    }
}
