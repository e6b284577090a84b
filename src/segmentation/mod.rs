//! Word segmentation pipeline
//!
//! Normalizes the page background, binarizes it, merges strokes into word
//! blobs, orders them into lines and cuts each word out of an upscaled copy of
//! the input.

pub mod filters;
pub mod pipeline;
pub mod steps;

pub use pipeline::{SegmentationReport, Segmenter};

use crate::config::Config;
use crate::error::SegmentError;
use crate::sink::DirSink;
use image::{imageops::FilterType, DynamicImage, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// File name of the optional JSON report inside the output directory
pub const MANIFEST_FILE: &str = "words.json";

/// Segment the configured input and write every artifact.
///
/// The input is decoded before the output directory is touched, so an
/// unreadable input leaves nothing behind.
pub fn run(config: &Config) -> Result<SegmentationReport, SegmentError> {
    let segmenter = Segmenter::new(config.params.clone())?;

    let page = load_image(&config.input)?;
    let crop_source = build_crop_source(&page, config.params.crop_scale);
    tracing::info!(
        "Loaded {} ({}x{}), crop source {}x{}",
        config.input.display(),
        page.width(),
        page.height(),
        crop_source.width(),
        crop_source.height()
    );

    let mut sink = DirSink::create(&config.output_dir, &config.processed_path)?;
    let report = segmenter.process(&page.to_rgb8(), &crop_source, &mut sink)?;

    if config.manifest {
        write_manifest(&sink.dir().join(MANIFEST_FILE), &report)?;
    }

    Ok(report)
}

pub fn load_image(path: &Path) -> Result<DynamicImage, SegmentError> {
    image::open(path).map_err(|source| SegmentError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Cubic upscale of the page that word crops are cut from
pub fn build_crop_source(page: &DynamicImage, scale: f32) -> RgbImage {
    let width = ((page.width() as f32 * scale).round() as u32).max(1);
    let height = ((page.height() as f32 * scale).round() as u32).max(1);
    page.resize_exact(width, height, FilterType::CatmullRom)
        .to_rgb8()
}

fn write_manifest(path: &Path, report: &SegmentationReport) -> Result<(), SegmentError> {
    let to_manifest_error = |source: std::io::Error| SegmentError::Manifest {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_manifest_error)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| to_manifest_error(e.into()))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
