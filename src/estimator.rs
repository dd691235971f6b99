// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose estimator interface.
//!
//! The model that produces keypoints is an external collaborator. Anything
//! that turns an image into a list of body estimates can drive a comparison
//! by implementing [`PoseEstimator`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PoseError, Result};
use crate::keypoints::RawPose;
use crate::source::LoadedImage;

/// Produces body estimates for an image.
///
/// Implementations are shared between the two comparison slots, which may run
/// in parallel.
pub trait PoseEstimator: Send + Sync {
    /// Estimate all bodies in `image`. An empty list means nobody was found.
    ///
    /// # Errors
    ///
    /// Returns an error if estimation itself fails.
    fn estimate(&self, image: &LoadedImage) -> Result<Vec<RawPose>>;
}

impl<F> PoseEstimator for F
where
    F: Fn(&LoadedImage) -> Result<Vec<RawPose>> + Send + Sync,
{
    fn estimate(&self, image: &LoadedImage) -> Result<Vec<RawPose>> {
        self(image)
    }
}

/// Reads precomputed estimates from a JSON file stored next to each image.
///
/// `photos/warrior.jpg` is paired with `photos/warrior.json`. The file holds
/// either a list of estimates or a single estimate object.
#[derive(Debug, Clone, Default)]
pub struct SidecarEstimator {
    extension: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SidecarFile {
    Many(Vec<RawPose>),
    One(RawPose),
}

impl SidecarEstimator {
    /// Create an estimator that reads `<image stem>.json`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different sidecar extension (e.g. `pose.json`).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Sidecar path for an image path.
    #[must_use]
    pub fn sidecar_path(&self, image_path: &Path) -> PathBuf {
        image_path.with_extension(self.extension.as_deref().unwrap_or("json"))
    }
}

impl PoseEstimator for SidecarEstimator {
    fn estimate(&self, image: &LoadedImage) -> Result<Vec<RawPose>> {
        let image_path = image.path.as_deref().ok_or_else(|| {
            PoseError::EstimatorError(format!("{} has no path to pair a sidecar with", image.name))
        })?;
        let sidecar = self.sidecar_path(image_path);
        read_estimates(&sidecar)
    }
}

/// Read estimates from a JSON file (a list or a single object).
///
/// # Errors
///
/// Returns [`PoseError::EstimatorError`] if the file cannot be read and
/// [`PoseError::PoseFormatError`] if it is not valid estimate JSON.
pub fn read_estimates(path: &Path) -> Result<Vec<RawPose>> {
    let text = fs::read_to_string(path)
        .map_err(|e| PoseError::EstimatorError(format!("{}: {e}", path.display())))?;
    parse_estimates(&text)
}

/// Parse estimates from JSON text (a list or a single object).
///
/// # Errors
///
/// Returns [`PoseError::PoseFormatError`] if the JSON does not describe estimates.
pub fn parse_estimates(text: &str) -> Result<Vec<RawPose>> {
    match serde_json::from_str::<SidecarFile>(text) {
        Ok(SidecarFile::Many(poses)) => Ok(poses),
        Ok(SidecarFile::One(pose)) => Ok(vec![pose]),
        Err(e) => Err(PoseError::PoseFormatError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::io::Write;

    fn loaded(path: Option<PathBuf>) -> LoadedImage {
        LoadedImage {
            name: "img.png".to_string(),
            path,
            image: DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
        }
    }

    #[test]
    fn test_parse_list_and_single() {
        let list = parse_estimates(r#"[{"keypoints": [{"x": 1, "y": 2, "score": 0.5}]}, {"keypoints": []}]"#)
            .unwrap();
        assert_eq!(list.len(), 2);

        let single = parse_estimates(r#"{"keypoints": [{"x": 1, "y": 2}], "score": 0.9}"#).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].score, Some(0.9));

        assert!(parse_estimates("[]").unwrap().is_empty());
        assert!(matches!(
            parse_estimates(r#"{"points": 3}"#),
            Err(PoseError::PoseFormatError(_))
        ));
    }

    #[test]
    fn test_sidecar_path() {
        let est = SidecarEstimator::new();
        assert_eq!(est.sidecar_path(Path::new("a/b.jpg")), PathBuf::from("a/b.json"));
        let est = SidecarEstimator::new().with_extension("pose.json");
        assert_eq!(est.sidecar_path(Path::new("b.png")), PathBuf::from("b.pose.json"));
    }

    #[test]
    fn test_sidecar_estimator_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("pose.png");
        let mut file = fs::File::create(dir.path().join("pose.json")).unwrap();
        write!(file, r#"[{{"keypoints": [{{"x": 4, "y": 5, "score": 0.8}}]}}]"#).unwrap();

        let estimates = SidecarEstimator::new()
            .estimate(&loaded(Some(image_path)))
            .unwrap();
        assert_eq!(estimates[0].keypoints[0].x, 4.0);
    }

    #[test]
    fn test_sidecar_estimator_errors() {
        let est = SidecarEstimator::new();
        assert!(matches!(
            est.estimate(&loaded(None)),
            Err(PoseError::EstimatorError(_))
        ));
        assert!(matches!(
            est.estimate(&loaded(Some(PathBuf::from("missing/img.png")))),
            Err(PoseError::EstimatorError(_))
        ));
    }

    #[test]
    fn test_closure_estimator() {
        let est = |_: &LoadedImage| -> Result<Vec<RawPose>> { Ok(Vec::new()) };
        assert!(est.estimate(&loaded(None)).unwrap().is_empty());
    }
}
