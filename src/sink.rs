use crate::error::SegmentError;
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};

/// Every image the pipeline writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Otsu binary mask, written outside the output directory
    Processed,
    Original,
    Erosion,
    Dilated,
    Closed,
    Contours,
    WordBoxes,
    /// 1-based word crop
    Word(usize),
}

impl Artifact {
    pub fn file_name(&self) -> String {
        match self {
            Artifact::Processed => "processed.png".to_string(),
            Artifact::Original => "original.png".to_string(),
            Artifact::Erosion => "erosion.png".to_string(),
            Artifact::Dilated => "dilated.png".to_string(),
            Artifact::Closed => "closed.png".to_string(),
            Artifact::Contours => "contours.png".to_string(),
            Artifact::WordBoxes => "word_boxes.png".to_string(),
            Artifact::Word(id) => format!("word_{}.png", id),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Destination for pipeline artifacts
pub trait ArtifactSink {
    /// Persist one image; the first failure aborts the run
    fn write(&mut self, artifact: Artifact, image: &DynamicImage) -> Result<(), SegmentError>;
}

/// Writes PNG files into an output directory
pub struct DirSink {
    dir: PathBuf,
    processed_path: PathBuf,
}

impl DirSink {
    /// Create the output directory (and parents) if needed
    pub fn create(dir: &Path, processed_path: &Path) -> Result<Self, SegmentError> {
        std::fs::create_dir_all(dir).map_err(|source| SegmentError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            processed_path: processed_path.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, artifact: Artifact) -> PathBuf {
        match artifact {
            Artifact::Processed => self.processed_path.clone(),
            other => self.dir.join(other.file_name()),
        }
    }
}

impl ArtifactSink for DirSink {
    fn write(&mut self, artifact: Artifact, image: &DynamicImage) -> Result<(), SegmentError> {
        let path = self.path_for(artifact);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| SegmentError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Keeps encoded PNG bytes in memory
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    pub files: std::collections::BTreeMap<String, Vec<u8>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn decode(&self, name: &str) -> Option<DynamicImage> {
        let bytes = self.files.get(name)?;
        image::load_from_memory_with_format(bytes, ImageFormat::Png).ok()
    }

    pub fn word_count(&self) -> usize {
        self.files.keys().filter(|k| k.starts_with("word_") && k.as_str() != "word_boxes.png").count()
    }
}

#[cfg(test)]
impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: Artifact, image: &DynamicImage) -> Result<(), SegmentError> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|source| SegmentError::Write {
                path: PathBuf::from(artifact.file_name()),
                source,
            })?;
        self.files.insert(artifact.file_name(), bytes);
        Ok(())
    }
}
