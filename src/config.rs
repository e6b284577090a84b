use crate::error::SegmentError;
use crate::Args;
use std::path::PathBuf;

/// Largest structuring element side accepted by `imageproc::morphology::Mask`
const MAX_KERNEL_SIDE: u32 = 511;

/// Upper bound for `line_tolerance` and `vertical_padding`, in pixels
pub const MAX_OFFSET: i32 = 10_000;

/// Largest upscale applied when building the crop source
pub const MAX_CROP_SCALE: f32 = 8.0;

/// Width and height of a rectangular structuring element or filter window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSize {
    pub width: u32,
    pub height: u32,
}

impl KernelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

/// How boxes found on the detection mask are mapped onto the crop source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CoordinateMapping {
    /// Scale by the ratio of crop-source to mask dimensions
    #[default]
    Scaled,
    /// Use mask coordinates as-is against the crop source
    Unscaled,
}

/// What to do with boxes that reach past the crop source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ClipPolicy {
    /// Intersect with the crop-source extent
    #[default]
    Clamp,
    /// Drop any box that is not fully inside
    Reject,
}

/// Tunable constants of the segmentation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationParams {
    /// Dilation window used to estimate the page background (7x7)
    pub background_kernel: KernelSize,
    /// Gaussian size used to smooth the background estimate (5)
    pub background_blur: u32,
    /// Gaussian size applied to the binary mask before adaptive thresholding (5)
    pub region_blur: u32,
    /// Neighborhood size of the Gaussian adaptive threshold (11)
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean (1)
    pub adaptive_offset: i32,
    /// Erosion element that trims noise and hairline joins (2x2)
    pub erode_kernel: KernelSize,
    /// Dilation/closing element that merges strokes into words (10 wide, 2 tall)
    pub merge_kernel: KernelSize,
    /// Maximum top-edge difference between consecutive boxes of one line (10)
    pub line_tolerance: i32,
    /// Boxes with `w * h` at or below this are noise (700)
    pub min_area: i64,
    /// Pixels added above and below each box (20)
    pub vertical_padding: i32,
    /// Scale applied to the input to build the crop source (1.5)
    pub crop_scale: f32,
    pub mapping: CoordinateMapping,
    pub clip: ClipPolicy,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            background_kernel: KernelSize::square(7),
            background_blur: 5,
            region_blur: 5,
            adaptive_block_size: 11,
            adaptive_offset: 1,
            erode_kernel: KernelSize::square(2),
            merge_kernel: KernelSize::new(10, 2),
            line_tolerance: 10,
            min_area: 700,
            vertical_padding: 20,
            crop_scale: 1.5,
            mapping: CoordinateMapping::default(),
            clip: ClipPolicy::default(),
        }
    }
}

impl SegmentationParams {
    /// Reject values the image operations cannot run with
    pub fn validate(&self) -> Result<(), SegmentError> {
        for (name, size) in [
            ("background blur", self.background_blur),
            ("region blur", self.region_blur),
            ("adaptive block size", self.adaptive_block_size),
        ] {
            if size < 3 || size % 2 == 0 {
                return Err(SegmentError::Usage(format!(
                    "{} must be an odd number >= 3, got {}",
                    name, size
                )));
            }
        }

        for (name, kernel) in [
            ("background kernel", self.background_kernel),
            ("erosion kernel", self.erode_kernel),
            ("merge kernel", self.merge_kernel),
        ] {
            let in_range = |side: u32| (1..=MAX_KERNEL_SIDE).contains(&side);
            if !in_range(kernel.width) || !in_range(kernel.height) {
                return Err(SegmentError::Usage(format!(
                    "{} must be between 1x1 and {}x{}, got {}x{}",
                    name, MAX_KERNEL_SIDE, MAX_KERNEL_SIDE, kernel.width, kernel.height
                )));
            }
        }

        let scale_ok = self.crop_scale.is_finite() && self.crop_scale > 0.0;
        if !scale_ok || self.crop_scale > MAX_CROP_SCALE {
            return Err(SegmentError::Usage(format!(
                "crop scale must be in (0, {}], got {}",
                MAX_CROP_SCALE, self.crop_scale
            )));
        }
        for (name, value) in [
            ("line tolerance", self.line_tolerance),
            ("padding", self.vertical_padding),
        ] {
            if !(0..=MAX_OFFSET).contains(&value) {
                return Err(SegmentError::Usage(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_OFFSET, value
                )));
            }
        }
        if self.min_area < 0 {
            return Err(SegmentError::Usage(format!(
                "minimum area must not be negative, got {}",
                self.min_area
            )));
        }

        Ok(())
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub processed_path: PathBuf,
    pub manifest: bool,
    pub params: SegmentationParams,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            output_dir: args.output_dir,
            processed_path: args.processed_path,
            manifest: args.manifest,
            params: SegmentationParams {
                line_tolerance: args.line_tolerance,
                min_area: args.min_area,
                vertical_padding: args.padding,
                crop_scale: args.crop_scale,
                mapping: args.mapping,
                clip: args.clip,
                ..SegmentationParams::default()
            },
        }
    }
}
