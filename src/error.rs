// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose comparison library.

use std::fmt;

/// Result type alias for pose comparison operations.
pub type Result<T> = std::result::Result<T, PoseError>;

/// Main error type for the pose comparison library.
///
/// Every variant is scoped to a single image slot. Scoring and rendering never
/// produce errors.
#[derive(Debug)]
pub enum PoseError {
    /// The estimator returned zero subjects for the image.
    NoPersonDetected,
    /// The uploaded file is not an image (MIME type does not start with `image/`).
    InvalidFileType(String),
    /// The uploaded file could not be read.
    FileReadFailure(String),
    /// The file was read but could not be decoded as an image.
    ImageDecodeFailure(String),
    /// The pose estimator failed for a reason other than an empty result.
    EstimatorError(String),
    /// Pose data (JSON or tensor) is malformed.
    PoseFormatError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Visualizer window error.
    VisualizerError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPersonDetected => write!(f, "No person detected in the image"),
            Self::InvalidFileType(msg) => write!(f, "Invalid file type: {msg}"),
            Self::FileReadFailure(msg) => write!(f, "File read failure: {msg}"),
            Self::ImageDecodeFailure(msg) => write!(f, "Image decode failure: {msg}"),
            Self::EstimatorError(msg) => write!(f, "Estimator error: {msg}"),
            Self::PoseFormatError(msg) => write!(f, "Pose format error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PoseError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageDecodeFailure(err.to_string())
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(err: serde_json::Error) -> Self {
        Self::PoseFormatError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoseError::NoPersonDetected;
        assert_eq!(err.to_string(), "No person detected in the image");

        let err = PoseError::InvalidFileType("text/plain".to_string());
        assert_eq!(err.to_string(), "Invalid file type: text/plain");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = PoseError::from(std::io::Error::other("disk gone"));
        assert!(err.source().is_some());
        assert!(PoseError::NoPersonDetected.source().is_none());
    }

    #[test]
    fn test_json_error_maps_to_format_error() {
        let json_err = serde_json::from_str::<Vec<f32>>("{not json").unwrap_err();
        assert!(matches!(
            PoseError::from(json_err),
            PoseError::PoseFormatError(_)
        ));
    }
}
