// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose similarity scoring.
//!
//! Two poses are compared keypoint by keypoint at matching COCO indices. Only
//! indices confident in both poses contribute a distance; the mean distance is
//! mapped linearly onto `0..=100` and then discounted by how many keypoints
//! the weaker detection found.
//!
//! ```rust
//! use ultralytics_pose_compare::{Keypoint, Pose, score};
//!
//! let keypoints = (0..17)
//!     .map(|i| Keypoint::new(i, 10.0 * i as f32, 5.0 * i as f32, 0.9))
//!     .collect();
//! let pose = Pose::new(keypoints, 0.9);
//! assert_eq!(score(&pose, &pose), 100);
//! ```

use std::fmt;

use crate::keypoints::{NUM_KEYPOINTS, Pose};

/// Pixel distances are divided by this before averaging.
///
/// Not adjusted for image resolution or subject size.
pub const DISTANCE_SCALE: f64 = 100.0;

/// Average scaled distance at which the base similarity reaches zero.
pub const DISTANCE_FALLOFF: f64 = 5.0;

/// Below this many valid keypoints (in the weaker pose) the severe penalty
/// applies.
pub const SEVERE_PENALTY_THRESHOLD: usize = 8;

/// Which penalty branch produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// `min_valid >= 8`: score discounted by detection quality.
    Normal,
    /// `min_valid < 8`: detection quality discount compounded by `min_valid / 8`.
    Severe,
}

impl Regime {
    /// Lowercase name of the branch.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Severe => "severe",
        }
    }
}

/// Intermediate values of a similarity computation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Valid keypoints in the first pose.
    pub valid_a: usize,
    /// Valid keypoints in the second pose.
    pub valid_b: usize,
    /// Indices valid in both poses.
    pub matched: usize,
    /// Mean scaled distance over matched indices (0 when nothing matched).
    pub avg_distance: f64,
    /// Similarity before the detection quality discount, in `[0, 100]`.
    pub base_similarity: f64,
    /// `min(valid_a, valid_b) / 17`.
    pub detection_quality: f64,
    /// Penalty branch taken.
    pub regime: Regime,
    /// Final score in `0..=100`.
    pub score: u8,
}

impl ScoreBreakdown {
    /// Smaller of the two valid keypoint counts.
    #[must_use]
    pub fn min_valid(&self) -> usize {
        self.valid_a.min(self.valid_b)
    }
}

/// Similarity between two poses, in `0..=100`.
///
/// Symmetric in its arguments. Poses without a single index valid in both
/// score 0.
#[must_use]
pub fn score(a: &Pose, b: &Pose) -> u8 {
    score_breakdown(a, b).score
}

/// Similarity between two poses with every intermediate value.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_breakdown(a: &Pose, b: &Pose) -> ScoreBreakdown {
    let valid_a = a.valid_count();
    let valid_b = b.valid_count();
    let min_valid = valid_a.min(valid_b);
    let detection_quality = min_valid as f64 / NUM_KEYPOINTS as f64;
    let regime = if min_valid < SEVERE_PENALTY_THRESHOLD {
        Regime::Severe
    } else {
        Regime::Normal
    };

    let distances: Vec<f64> = a
        .keypoints()
        .iter()
        .zip(b.keypoints())
        .filter(|(ka, kb)| ka.is_valid() && kb.is_valid())
        .map(|(ka, kb)| {
            let dx = (f64::from(ka.x) - f64::from(kb.x)) / DISTANCE_SCALE;
            let dy = (f64::from(ka.y) - f64::from(kb.y)) / DISTANCE_SCALE;
            (dx * dx + dy * dy).sqrt()
        })
        .collect();

    if distances.is_empty() {
        return ScoreBreakdown {
            valid_a,
            valid_b,
            matched: 0,
            avg_distance: 0.0,
            base_similarity: 0.0,
            detection_quality,
            regime,
            score: 0,
        };
    }

    let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
    let base_similarity = ((1.0 - avg_distance / DISTANCE_FALLOFF) * 100.0).max(0.0);

    let penalty = match regime {
        Regime::Severe => {
            let severe = min_valid as f64 / SEVERE_PENALTY_THRESHOLD as f64;
            detection_quality * severe
        }
        Regime::Normal => detection_quality,
    };
    let final_score = (base_similarity * penalty).round().clamp(0.0, 100.0) as u8;

    ScoreBreakdown {
        valid_a,
        valid_b,
        matched: distances.len(),
        avg_distance,
        base_similarity,
        detection_quality,
        regime,
        score: final_score,
    }
}

/// Qualitative feedback for a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    /// 90 and above.
    Excellent,
    /// 70 to 89.
    Great,
    /// 50 to 69.
    Good,
    /// 30 to 49.
    Fair,
    /// Below 30.
    Poor,
}

impl Feedback {
    /// Feedback tier for a score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            70..=89 => Self::Great,
            50..=69 => Self::Good,
            30..=49 => Self::Fair,
            _ => Self::Poor,
        }
    }

    /// Short label for the tier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Great => "great",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }

    /// User-facing message for the tier.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Perfect match! You nailed the pose.",
            Self::Great => "Great job, almost there.",
            Self::Good => "Good effort, adjust your limbs a little.",
            Self::Fair => "Getting closer, keep practicing.",
            Self::Poor => "Not quite, try matching the target pose again.",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
