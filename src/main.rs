use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod geometry;
mod segmentation;
mod sink;

use config::{ClipPolicy, CoordinateMapping};

#[derive(Parser, Debug)]
#[command(name = "word-segmenter")]
#[command(about = "Split a page image into word crops in reading order")]
#[command(version)]
pub struct Args {
    /// Page image to segment
    pub input: PathBuf,

    /// Directory receiving diagnostic images and word crops (created if missing)
    pub output_dir: PathBuf,

    /// Where the Otsu binary mask is written
    #[arg(long, env = "WORDSEG_PROCESSED_PATH", default_value = "processed.png")]
    pub processed_path: PathBuf,

    /// Maximum top-edge difference (px) between boxes on the same line
    #[arg(long, env = "WORDSEG_LINE_TOLERANCE", default_value = "10")]
    pub line_tolerance: i32,

    /// Boxes with an area at or below this are discarded
    #[arg(long, env = "WORDSEG_MIN_AREA", default_value = "700")]
    pub min_area: i64,

    /// Pixels added above and below every word box
    #[arg(long, env = "WORDSEG_PADDING", default_value = "20")]
    pub padding: i32,

    /// Scale applied to the input to build the crop source
    #[arg(long, env = "WORDSEG_CROP_SCALE", default_value = "1.5")]
    pub crop_scale: f32,

    /// How detection boxes are mapped onto the crop source
    #[arg(long, env = "WORDSEG_MAPPING", value_enum, default_value_t = CoordinateMapping::Scaled)]
    pub mapping: CoordinateMapping,

    /// What to do with boxes reaching past the crop source
    #[arg(long, env = "WORDSEG_CLIP", value_enum, default_value_t = ClipPolicy::Clamp)]
    pub clip: ClipPolicy,

    /// Also write words.json describing every crop
    #[arg(long, env = "WORDSEG_MANIFEST")]
    pub manifest: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from(args);

    tracing::info!("Starting word-segmenter v{}", env!("CARGO_PKG_VERSION"));

    match segmentation::run(&config) {
        Ok(report) => {
            tracing::info!(
                "Saved {} word crops from {} contours in {} lines ({}ms) to {}",
                report.words.len(),
                report.contour_count,
                report.line_count,
                report.total_time_ms,
                config.output_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            let code = e.code();
            Err(anyhow::Error::new(e).context(code))
        }
    }
}
