use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SegmentError {
    /// Short error code used in the final log line
    pub fn code(&self) -> &'static str {
        match self {
            SegmentError::Usage(_) => "USAGE_ERROR",
            SegmentError::Decode { .. } => "DECODE_ERROR",
            SegmentError::OutputDir { .. }
            | SegmentError::Write { .. }
            | SegmentError::Manifest { .. } => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_group_io_failures() {
        let err = SegmentError::OutputDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(SegmentError::Usage("x".into()).code(), "USAGE_ERROR");
    }

    #[test]
    fn test_decode_error_message_names_path() {
        let source = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = SegmentError::Decode {
            path: PathBuf::from("page.png"),
            source,
        };
        assert!(err.to_string().contains("page.png"));
        assert_eq!(err.code(), "DECODE_ERROR");
    }
}
