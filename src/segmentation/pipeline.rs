use crate::config::SegmentationParams;
use crate::error::SegmentError;
use crate::geometry::BoundingBox;
use crate::sink::{Artifact, ArtifactSink};
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single pipeline step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// One written word crop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordSummary {
    pub id: usize,
    pub file: String,
    /// Padded and squared box on the detection mask
    pub detected: BoundingBox,
    /// Clipped box on the crop source
    pub crop: BoundingBox,
}

/// Result of a segmentation run including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationReport {
    /// Otsu level chosen by the binarizer
    pub otsu_level: u8,
    pub contour_count: usize,
    pub line_count: usize,
    /// Boxes that survived the area filter
    pub candidate_count: usize,
    pub words: Vec<WordSummary>,
    /// Total processing time in milliseconds
    pub total_time_ms: u64,
    pub steps: Vec<StepTiming>,
}

/// State every stage needs beyond its input image
pub struct PipelineContext<'a> {
    pub params: &'a SegmentationParams,
    /// Image the word crops are cut from; may differ in size from the mask
    pub crop_source: &'a RgbImage,
    pub sink: &'a mut dyn ArtifactSink,
}

/// Runs the five segmentation stages in order
pub struct Segmenter {
    params: SegmentationParams,
}

impl Segmenter {
    pub fn new(params: SegmentationParams) -> Result<Self, SegmentError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Segment `page` and cut the words out of `crop_source`.
    ///
    /// Diagnostics are written as soon as each stage finishes, so a failed
    /// write leaves the earlier ones behind.
    pub fn process(
        &self,
        page: &RgbImage,
        crop_source: &RgbImage,
        sink: &mut dyn ArtifactSink,
    ) -> Result<SegmentationReport, SegmentError> {
        let start = Instant::now();
        let mut timings = Vec::new();
        let params = &self.params;
        let mut ctx = PipelineContext {
            params,
            crop_source,
            sink,
        };

        let normalized = run_step("background", &mut timings, || {
            Ok(steps::background::apply(page, params))
        })?;

        let binarized = run_step("binarize", &mut timings, || {
            Ok(steps::binarize::apply(&normalized))
        })?;
        let mask = DynamicImage::ImageLuma8(binarized.mask.clone());
        ctx.sink.write(Artifact::Processed, &mask)?;
        ctx.sink.write(Artifact::Original, &mask)?;
        tracing::debug!("Otsu level {}", binarized.level);

        let regions = run_step("regions", &mut timings, || {
            Ok(steps::regions::detect(&binarized.mask, params))
        })?;
        ctx.sink
            .write(Artifact::Erosion, &DynamicImage::ImageLuma8(regions.eroded.clone()))?;
        ctx.sink
            .write(Artifact::Dilated, &DynamicImage::ImageLuma8(regions.dilated.clone()))?;
        ctx.sink
            .write(Artifact::Closed, &DynamicImage::ImageLuma8(regions.closed.clone()))?;
        ctx.sink
            .write(Artifact::Contours, &DynamicImage::ImageRgb8(regions.overlay.clone()))?;

        let lines = run_step("sequence", &mut timings, || {
            let boxes = steps::sequence::boxes_from_contours(&regions.contours);
            Ok(steps::sequence::group_lines(boxes, params.line_tolerance))
        })?;
        for (i, line) in lines.iter().enumerate() {
            tracing::debug!(line = i + 1, top = line.top(), boxes = line.len(), "Text line");
        }
        let ordered = steps::sequence::reading_order(&lines);

        let extraction = run_step("extract", &mut timings, || {
            steps::extract::extract(&mut ctx, &ordered, &binarized.mask)
        })?;

        tracing::info!(
            "Segmented {} contours into {} lines, {} of {} candidates written",
            regions.contours.len(),
            lines.len(),
            extraction.words.len(),
            extraction.candidates
        );

        Ok(SegmentationReport {
            otsu_level: binarized.level,
            contour_count: regions.contours.len(),
            line_count: lines.len(),
            candidate_count: extraction.candidates,
            words: extraction.words,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: timings,
        })
    }
}

fn run_step<T, F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> Result<T, SegmentError>
where
    F: FnOnce() -> Result<T, SegmentError>,
{
    let step_start = Instant::now();
    let result = step_fn()?;
    let time_ms = step_start.elapsed().as_millis() as u64;
    tracing::debug!("Step {} took {}ms", name, time_ms);
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms,
    });
    Ok(result)
}
