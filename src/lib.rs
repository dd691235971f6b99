// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Ultralytics Pose Compare
//!
//! Pose similarity scoring and skeleton rendering for two-image pose challenges.
//! A *target* pose is compared against a *challenge* pose and the pair is reduced
//! to a single 0-100 similarity score, with both skeletons drawn over their images.
//!
//! ## Features
//!
//! - **COCO-17 Normalization** - Raw estimator output is padded or truncated to 17 named keypoints
//! - **Confidence-Gated Scoring** - Only keypoints above `0.3` confidence in both poses contribute
//! - **Detection Penalty** - Sparse detections are penalized, with a severe regime below 8 valid joints
//! - **Skeleton Rendering** - Aspect-preserving canvas at a fixed display height with a soft glow
//! - **Stale-Result Guarding** - Late detections for a replaced image are discarded
//!
//! ## Quick Start (Library)
//!
//! ```
//! use ultralytics_pose_compare::{Feedback, Keypoint, Pose, score};
//!
//! let keypoints: Vec<Keypoint> = (0..17)
//!     .map(|i| Keypoint::new(i, 100.0 + i as f32 * 10.0, 200.0, 0.9))
//!     .collect();
//! let target = Pose::new(keypoints, 0.9);
//!
//! let result = score(&target, &target);
//! assert_eq!(result, 100);
//! assert_eq!(Feedback::from_score(result), Feedback::Excellent);
//! ```
//!
//! ## CLI Usage
//!
//! Pose estimates are read from JSON sidecar files next to each image
//! (`photo.jpg` -> `photo.json`):
//!
//! ```bash
//! # Compare two images and save the side-by-side overlay
//! ultralytics-pose-compare compare --target target.jpg --challenge attempt.jpg --save
//!
//! # Score two pose files without rendering
//! ultralytics-pose-compare score -t target.json -c attempt.json --json
//!
//! # Render a single skeleton on a black canvas
//! ultralytics-pose-compare render --image photo.jpg --hide-image --output skeleton.png
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use ultralytics_pose_compare::RenderConfig;
//!
//! let config = RenderConfig::new()
//!     .with_display_height(480) // Canvas height in pixels
//!     .with_line_width(4)       // Bone thickness
//!     .with_glow(6.0, 0.5);     // Blur sigma and blend strength
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoints`] | Keypoint types and COCO-17 normalization ([`Pose`], [`Keypoint`]) |
//! | [`scoring`] | Similarity scoring ([`score`], [`ScoreBreakdown`], [`Feedback`]) |
//! | [`annotate`] | Skeleton renderer ([`render_pose`], [`RenderConfig`]) |
//! | [`session`] | Two-slot comparison state ([`Session`], [`ScoreNotifier`]) |
//! | [`estimator`] | Pose estimator seam ([`PoseEstimator`], [`SidecarEstimator`]) |
//! | [`source`] | Upload validation and decoding ([`ImageUpload`], [`LoadedImage`]) |
//! | [`error`] | Error types ([`PoseError`], [`Result`]) |
//! | [`visualizer`] | Skeleton topology, colors and the optional viewer window |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Real-time window display for `compare --show` |
//!
//! ## License
//!
//! This project is dual-licensed under [AGPL-3.0](https://github.com/ultralytics/inference/blob/main/LICENSE)
//! for open-source use or [Ultralytics Enterprise License](https://ultralytics.com/license)
//! for commercial applications.

// Modules
pub mod annotate;
pub mod cli;
pub mod error;
pub mod estimator;
pub mod io;
pub mod keypoints;
pub mod scoring;
pub mod session;
pub mod source;
pub mod visualizer;

// Re-export main types for convenience
pub use annotate::{RenderConfig, draw_pose, render_pose};
pub use error::{PoseError, Result};
pub use estimator::{PoseEstimator, SidecarEstimator};
pub use keypoints::{Keypoint, Pose, RawKeypoint, RawPose};
pub use scoring::{Feedback, Regime, ScoreBreakdown, score, score_breakdown};
pub use session::{ScoreListener, ScoreNotifier, Session, SlotKind};
pub use source::{ImageUpload, LoadedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "ultralytics-pose-compare");
    }
}
