// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint and pose types, and normalization of raw estimator output.
//!
//! Estimators report one entry per detected body. The comparison works on a
//! single subject, so [`Pose::from_estimates`] keeps the first entry and maps
//! its points onto the fixed COCO-17 anatomical order.

use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};

use crate::error::{PoseError, Result};

/// Number of keypoints in a COCO-17 pose.
pub const NUM_KEYPOINTS: usize = 17;

/// Keypoints with a confidence strictly above this value are valid.
pub const VALID_THRESHOLD: f32 = 0.3;

/// COCO keypoint names, indexed by keypoint position.
pub const KEYPOINT_NAMES: [&str; NUM_KEYPOINTS] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// A single keypoint as reported by an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    /// X coordinate in pixels.
    pub x: f32,
    /// Y coordinate in pixels.
    pub y: f32,
    /// Confidence, if the estimator reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One body estimate as reported by an estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPose {
    /// Keypoints in COCO order.
    pub keypoints: Vec<RawKeypoint>,
    /// Overall detection confidence, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One anatomical landmark in image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate in the original image.
    pub x: f32,
    /// Y coordinate in the original image.
    pub y: f32,
    /// Detector confidence in `[0, 1]`.
    pub score: f32,
    /// Anatomical name (e.g. `left_shoulder`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Keypoint {
    /// Create a named keypoint for the given COCO index.
    ///
    /// Non-finite inputs produce a zero-confidence keypoint.
    #[must_use]
    pub fn new(index: usize, x: f32, y: f32, score: f32) -> Self {
        let finite = x.is_finite() && y.is_finite() && score.is_finite();
        Self {
            x: if finite { x } else { 0.0 },
            y: if finite { y } else { 0.0 },
            score: if finite { score } else { 0.0 },
            name: KEYPOINT_NAMES.get(index).map(|n| (*n).to_string()),
        }
    }

    /// Whether the keypoint is confident enough to be scored and drawn.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.score > VALID_THRESHOLD
    }
}

/// Full 17-keypoint estimate for one subject in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseFields")]
pub struct Pose {
    keypoints: Vec<Keypoint>,
    /// Overall detection confidence.
    pub score: f32,
}

/// Serialized form of [`Pose`]; deserializing goes through [`Pose::new`].
#[derive(Deserialize)]
struct PoseFields {
    keypoints: Vec<Keypoint>,
    #[serde(default)]
    score: f32,
}

impl From<PoseFields> for Pose {
    fn from(fields: PoseFields) -> Self {
        Self::new(fields.keypoints, fields.score)
    }
}

impl Pose {
    /// Build a pose from keypoints in COCO order.
    ///
    /// Missing trailing indices are filled with zero-confidence keypoints and
    /// anything past the 17th keypoint is dropped, so the result always holds
    /// exactly [`NUM_KEYPOINTS`] entries. Unnamed keypoints take the COCO
    /// name of their position.
    #[must_use]
    pub fn new(mut keypoints: Vec<Keypoint>, score: f32) -> Self {
        keypoints.truncate(NUM_KEYPOINTS);
        for (kp, name) in keypoints.iter_mut().zip(KEYPOINT_NAMES) {
            if kp.name.is_none() {
                kp.name = Some(name.to_string());
            }
        }
        for i in keypoints.len()..NUM_KEYPOINTS {
            keypoints.push(Keypoint::new(i, 0.0, 0.0, 0.0));
        }
        Self {
            keypoints,
            score: if score.is_finite() { score } else { 0.0 },
        }
    }

    /// Normalize estimator output into a single pose.
    ///
    /// The first estimate is used; confidences the estimator left out count
    /// as zero.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::NoPersonDetected`] if `estimates` is empty.
    pub fn from_estimates(estimates: &[RawPose]) -> Result<Self> {
        let first = estimates.first().ok_or(PoseError::NoPersonDetected)?;
        let keypoints = first
            .keypoints
            .iter()
            .take(NUM_KEYPOINTS)
            .enumerate()
            .map(|(i, kp)| Keypoint::new(i, kp.x, kp.y, kp.score.unwrap_or(0.0)))
            .collect();
        Ok(Self::new(keypoints, first.score.unwrap_or(0.0)))
    }

    /// Normalize a keypoint tensor of shape `(N, K, 2)` or `(N, K, 3)`.
    ///
    /// This is the layout pose models emit: one row per body, `x, y` and an
    /// optional visibility channel per keypoint. Without the third channel
    /// every confidence is zero.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::NoPersonDetected`] if `N == 0`, or
    /// [`PoseError::PoseFormatError`] if the last axis is not 2 or 3.
    pub fn from_array(data: ArrayView3<'_, f32>, score: f32) -> Result<Self> {
        let (bodies, _, channels) = data.dim();
        if channels != 2 && channels != 3 {
            return Err(PoseError::PoseFormatError(format!(
                "expected 2 or 3 values per keypoint, got {channels}"
            )));
        }
        if bodies == 0 {
            return Err(PoseError::NoPersonDetected);
        }

        let first = data.index_axis(ndarray::Axis(0), 0);
        let keypoints = first
            .outer_iter()
            .take(NUM_KEYPOINTS)
            .enumerate()
            .map(|(i, point)| {
                let conf = if channels == 3 { point[2] } else { 0.0 };
                Keypoint::new(i, point[0], point[1], conf)
            })
            .collect();
        Ok(Self::new(keypoints, score))
    }

    /// Keypoints in COCO order. Always exactly [`NUM_KEYPOINTS`] long.
    #[must_use]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Number of valid keypoints.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.keypoints.iter().filter(|kp| kp.is_valid()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn raw(n: usize, score: Option<f32>) -> RawPose {
        RawPose {
            keypoints: (0..n)
                .map(|i| RawKeypoint {
                    x: i as f32 * 10.0,
                    y: i as f32 * 20.0,
                    score,
                })
                .collect(),
            score: Some(0.8),
        }
    }

    #[test]
    fn test_empty_estimates_is_no_person() {
        assert!(matches!(
            Pose::from_estimates(&[]),
            Err(PoseError::NoPersonDetected)
        ));
    }

    #[test]
    fn test_first_estimate_is_used() {
        let mut second = raw(17, Some(0.9));
        second.keypoints[0].x = 999.0;
        let pose = Pose::from_estimates(&[raw(17, Some(0.9)), second]).unwrap();
        assert_eq!(pose.keypoints()[0].x, 0.0);
        assert_eq!(pose.keypoints()[3].y, 60.0);
        assert!((pose.score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_names_attached_by_position() {
        let pose = Pose::from_estimates(&[raw(17, Some(0.9))]).unwrap();
        for (kp, name) in pose.keypoints().iter().zip(KEYPOINT_NAMES) {
            assert_eq!(kp.name.as_deref(), Some(name));
        }
        assert_eq!(pose.keypoints()[16].name.as_deref(), Some("right_ankle"));
    }

    #[test]
    fn test_missing_confidence_defaults_to_zero() {
        let pose = Pose::from_estimates(&[raw(17, None)]).unwrap();
        assert!(pose.keypoints().iter().all(|kp| kp.score == 0.0));
        assert_eq!(pose.valid_count(), 0);
    }

    #[test]
    fn test_short_and_long_estimates_are_padded_or_truncated() {
        let short = Pose::from_estimates(&[raw(5, Some(0.9))]).unwrap();
        assert_eq!(short.keypoints().len(), NUM_KEYPOINTS);
        assert_eq!(short.valid_count(), 5);

        let long = Pose::from_estimates(&[raw(30, Some(0.9))]).unwrap();
        assert_eq!(long.keypoints().len(), NUM_KEYPOINTS);
        assert_eq!(long.valid_count(), NUM_KEYPOINTS);
    }

    #[test]
    fn test_validity_threshold_is_strict() {
        assert!(!Keypoint::new(0, 1.0, 1.0, 0.3).is_valid());
        assert!(Keypoint::new(0, 1.0, 1.0, 0.31).is_valid());
    }

    #[test]
    fn test_non_finite_is_invalid() {
        let kp = Keypoint::new(0, f32::NAN, 1.0, 0.9);
        assert!(!kp.is_valid());
        assert_eq!(kp.x, 0.0);
    }

    #[test]
    fn test_from_array() {
        let mut data = Array3::<f32>::zeros((2, 17, 3));
        data[[0, 5, 0]] = 120.0;
        data[[0, 5, 1]] = 80.0;
        data[[0, 5, 2]] = 0.95;
        data[[1, 5, 2]] = 0.1;
        let pose = Pose::from_array(data.view(), 0.7).unwrap();
        assert_eq!(pose.valid_count(), 1);
        assert_eq!(pose.keypoints()[5].x, 120.0);
        assert_eq!(pose.keypoints()[5].name.as_deref(), Some("left_shoulder"));
    }

    #[test]
    fn test_from_array_without_confidence() {
        let data = Array3::<f32>::ones((1, 17, 2));
        let pose = Pose::from_array(data.view(), 0.5).unwrap();
        assert_eq!(pose.valid_count(), 0);
    }

    #[test]
    fn test_from_array_errors() {
        let empty = Array3::<f32>::zeros((0, 17, 3));
        assert!(matches!(
            Pose::from_array(empty.view(), 0.0),
            Err(PoseError::NoPersonDetected)
        ));
        let bad = Array3::<f32>::zeros((1, 17, 4));
        assert!(matches!(
            Pose::from_array(bad.view(), 0.0),
            Err(PoseError::PoseFormatError(_))
        ));
    }

    #[test]
    fn test_pose_json_keeps_seventeen_keypoints() {
        let json = r#"{"keypoints": [{"x": 1.0, "y": 2.0, "score": 0.9}], "score": 0.4}"#;
        let pose: Pose = serde_json::from_str(json).unwrap();
        assert_eq!(pose.keypoints().len(), NUM_KEYPOINTS);
        assert_eq!(pose.valid_count(), 1);
    }

    #[test]
    fn test_pose_json_names_unnamed_keypoints() {
        let json = r#"{"keypoints": [
            {"x": 1.0, "y": 2.0, "score": 0.9},
            {"x": 3.0, "y": 4.0, "score": 0.9, "name": "custom"}
        ]}"#;
        let pose: Pose = serde_json::from_str(json).unwrap();
        assert_eq!(pose.keypoints()[0].name.as_deref(), Some("nose"));
        assert_eq!(pose.keypoints()[1].name.as_deref(), Some("custom"));
        assert_eq!(pose.keypoints()[16].name.as_deref(), Some("right_ankle"));
    }

    #[test]
    fn test_raw_pose_json() {
        let json = r#"{"keypoints": [{"x": 1.0, "y": 2.0, "score": 0.5}, {"x": 3.0, "y": 4.0}]}"#;
        let raw: RawPose = serde_json::from_str(json).unwrap();
        assert_eq!(raw.keypoints[1].score, None);
        assert_eq!(raw.score, None);
        let pose = Pose::from_estimates(&[raw]).unwrap();
        assert_eq!(pose.score, 0.0);
        assert_eq!(pose.valid_count(), 1);
    }
}
