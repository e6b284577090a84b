use crate::config::{ClipPolicy, CoordinateMapping, SegmentationParams};
use crate::error::SegmentError;
use crate::geometry::BoundingBox;
use crate::segmentation::pipeline::{PipelineContext, WordSummary};
use crate::sink::Artifact;
use image::{imageops, DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// A finished word: its 1-based id, boxes and crop
#[derive(Debug, Clone)]
pub struct WordRegion {
    pub id: usize,
    /// Padded and squared box in detection coordinates
    pub detected: BoundingBox,
    /// Clipped box in crop-source coordinates
    pub crop_box: BoundingBox,
    pub image: RgbImage,
}

impl WordRegion {
    fn summary(&self) -> WordSummary {
        WordSummary {
            id: self.id,
            file: Artifact::Word(self.id).file_name(),
            detected: self.detected,
            crop: self.crop_box,
        }
    }
}

/// Output of the extraction step
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Boxes that survived the area filter
    pub candidates: usize,
    pub words: Vec<WordSummary>,
}

/// Area filter, vertical padding and squaring. `None` for noise.
pub fn expand(bbox: BoundingBox, params: &SegmentationParams) -> Option<BoundingBox> {
    if bbox.area() <= params.min_area {
        return None;
    }
    Some(bbox.pad_vertical(params.vertical_padding).squarify())
}

/// Place a detection box on the crop source according to the mapping and
/// clip policies. `None` when nothing of it can be cropped.
pub fn locate(
    detected: BoundingBox,
    detection_dims: (u32, u32),
    source_dims: (u32, u32),
    params: &SegmentationParams,
) -> Option<BoundingBox> {
    let mapped = match params.mapping {
        CoordinateMapping::Scaled => detected.scale(
            source_dims.0 as f64 / detection_dims.0 as f64,
            source_dims.1 as f64 / detection_dims.1 as f64,
        ),
        CoordinateMapping::Unscaled => detected,
    };

    match params.clip {
        ClipPolicy::Clamp => mapped.intersect_extent(source_dims.0, source_dims.1),
        ClipPolicy::Reject => mapped
            .is_inside(source_dims.0, source_dims.1)
            .then_some(mapped),
    }
}

/// Expand, crop and persist every box in sequence order, then write the
/// overlay of all surviving boxes drawn over `base`.
pub fn extract(
    ctx: &mut PipelineContext<'_>,
    boxes: &[BoundingBox],
    base: &GrayImage,
) -> Result<Extraction, SegmentError> {
    let mut overlay = DynamicImage::ImageLuma8(base.clone()).to_rgb8();
    let detection_dims = base.dimensions();
    let source_dims = ctx.crop_source.dimensions();

    let mut candidates = 0;
    let mut words = Vec::new();

    for &bbox in boxes {
        let Some(detected) = expand(bbox, ctx.params) else {
            tracing::trace!(?bbox, "Discarding noise-sized box");
            continue;
        };
        candidates += 1;

        let Some(crop_box) = locate(detected, detection_dims, source_dims, ctx.params) else {
            tracing::warn!(?detected, "Box falls outside the crop source, skipping");
            continue;
        };

        draw_thick_rect(&mut overlay, detected);

        let region = WordRegion {
            id: words.len() + 1,
            detected,
            crop_box,
            image: imageops::crop_imm(
                ctx.crop_source,
                crop_box.x as u32,
                crop_box.y as u32,
                crop_box.w as u32,
                crop_box.h as u32,
            )
            .to_image(),
        };

        ctx.sink.write(
            Artifact::Word(region.id),
            &DynamicImage::ImageRgb8(region.image.clone()),
        )?;
        tracing::debug!(id = region.id, ?crop_box, "Saved word crop");
        words.push(region.summary());
    }

    ctx.sink
        .write(Artifact::WordBoxes, &DynamicImage::ImageRgb8(overlay))?;

    Ok(Extraction { candidates, words })
}

/// Two pixel wide outline
fn draw_thick_rect(canvas: &mut RgbImage, bbox: BoundingBox) {
    draw_hollow_rect_mut(canvas, bbox.to_rect(), BOX_COLOR);
    if bbox.w > 2 && bbox.h > 2 {
        let inner = BoundingBox::new(bbox.x + 1, bbox.y + 1, bbox.w - 2, bbox.h - 2);
        draw_hollow_rect_mut(canvas, inner.to_rect(), BOX_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use image::Luma;

    fn unscaled(clip: ClipPolicy) -> SegmentationParams {
        SegmentationParams {
            mapping: CoordinateMapping::Unscaled,
            clip,
            ..SegmentationParams::default()
        }
    }

    fn run_extract(
        params: &SegmentationParams,
        boxes: &[BoundingBox],
        base: &GrayImage,
        source: &RgbImage,
    ) -> (Extraction, MemorySink) {
        let mut sink = MemorySink::default();
        let mut ctx = PipelineContext {
            params,
            crop_source: source,
            sink: &mut sink,
        };
        let extraction = extract(&mut ctx, boxes, base).unwrap();
        (extraction, sink)
    }

    #[test]
    fn test_area_at_threshold_is_noise() {
        let params = SegmentationParams::default();
        assert_eq!(expand(BoundingBox::new(0, 0, 35, 20), &params), None);
        assert!(expand(BoundingBox::new(0, 0, 701, 1), &params).is_some());
    }

    #[test]
    fn test_expand_pads_then_squares() {
        let params = SegmentationParams::default();
        // 60x30 -> padded 60x70 -> squared 70x70
        let expanded = expand(BoundingBox::new(100, 100, 60, 30), &params).unwrap();
        assert_eq!(expanded, BoundingBox::new(95, 80, 70, 70));
    }

    #[test]
    fn test_expand_wide_box_grows_height() {
        let params = SegmentationParams::default();
        // 120x30 -> padded 120x70 -> squared 120x120
        let expanded = expand(BoundingBox::new(0, 200, 120, 30), &params).unwrap();
        assert_eq!(expanded, BoundingBox::new(0, 155, 120, 120));
    }

    #[test]
    fn test_scaled_mapping_follows_dimension_ratio() {
        let params = SegmentationParams::default();
        let located = locate(
            BoundingBox::new(10, 20, 30, 30),
            (100, 100),
            (150, 150),
            &params,
        );
        assert_eq!(located, Some(BoundingBox::new(15, 30, 45, 45)));
    }

    #[test]
    fn test_unscaled_mapping_keeps_coordinates() {
        let params = unscaled(ClipPolicy::Clamp);
        let located = locate(
            BoundingBox::new(10, 20, 30, 30),
            (100, 100),
            (150, 150),
            &params,
        );
        assert_eq!(located, Some(BoundingBox::new(10, 20, 30, 30)));
    }

    #[test]
    fn test_border_box_is_clamped() {
        let base = GrayImage::from_pixel(100, 100, Luma([255]));
        let source = RgbImage::from_pixel(100, 100, Rgb([200, 10, 10]));
        let params = unscaled(ClipPolicy::Clamp);

        // 40x30 at the corner -> padded (0,-20,40,70) -> squared (-15,-20,70,70)
        let (extraction, sink) =
            run_extract(&params, &[BoundingBox::new(0, 0, 40, 30)], &base, &source);

        assert_eq!(extraction.candidates, 1);
        assert_eq!(extraction.words.len(), 1);
        let word = &extraction.words[0];
        assert_eq!(word.detected, BoundingBox::new(-15, -20, 70, 70));
        assert_eq!(word.crop, BoundingBox::new(0, 0, 55, 50));

        let crop = sink.decode("word_1.png").unwrap();
        assert_eq!((crop.width(), crop.height()), (55, 50));
    }

    #[test]
    fn test_border_box_is_rejected() {
        let base = GrayImage::from_pixel(100, 100, Luma([255]));
        let source = RgbImage::from_pixel(100, 100, Rgb([200, 10, 10]));
        let params = unscaled(ClipPolicy::Reject);

        let boxes = [BoundingBox::new(0, 0, 40, 30), BoundingBox::new(30, 40, 40, 20)];
        let (extraction, sink) = run_extract(&params, &boxes, &base, &source);

        assert_eq!(extraction.candidates, 2);
        assert_eq!(extraction.words.len(), 1);
        assert_eq!(extraction.words[0].id, 1);
        assert_eq!(extraction.words[0].detected, BoundingBox::new(20, 20, 60, 60));
        assert_eq!(sink.word_count(), 1);
    }

    #[test]
    fn test_words_are_numbered_in_sequence_order() {
        let base = GrayImage::from_pixel(300, 200, Luma([255]));
        let source = RgbImage::from_pixel(450, 300, Rgb([255, 255, 255]));
        let params = SegmentationParams::default();

        let boxes = [
            BoundingBox::new(20, 40, 60, 24),
            BoundingBox::new(5, 5, 3, 3),
            BoundingBox::new(120, 40, 60, 24),
            BoundingBox::new(20, 120, 60, 24),
        ];
        let (extraction, sink) = run_extract(&params, &boxes, &base, &source);

        assert_eq!(extraction.candidates, 3);
        let ids: Vec<usize> = extraction.words.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(extraction.words[1].detected.x, 118);
        assert_eq!(extraction.words[2].file, "word_3.png");
        assert_eq!(sink.word_count(), 3);
        assert!(sink.files.contains_key("word_boxes.png"));
    }

    #[test]
    fn test_no_boxes_leaves_overlay_untouched() {
        let base = GrayImage::from_fn(50, 40, |x, y| Luma([((x + y) % 2 * 255) as u8]));
        let source = RgbImage::new(75, 60);
        let params = SegmentationParams::default();

        let (extraction, sink) = run_extract(&params, &[], &base, &source);

        assert!(extraction.words.is_empty());
        let overlay = sink.decode("word_boxes.png").unwrap().to_rgb8();
        assert_eq!(overlay, DynamicImage::ImageLuma8(base).to_rgb8());
    }
}
