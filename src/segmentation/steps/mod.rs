//! Individual segmentation stages

pub mod background;
pub mod binarize;
pub mod extract;
pub mod regions;
pub mod sequence;
