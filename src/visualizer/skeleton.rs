// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use super::color::{Color, SHOULDER_LINE_COLOR};

/// Body skeleton drawn over a pose (pairs of COCO keypoint indices).
/// The face is not connected; only the 12 limb and torso bones are drawn.
pub const SKELETON: [[usize; 2]; 12] = [
    [5, 6],   // left shoulder to right shoulder
    [5, 7],   // left shoulder to left elbow
    [7, 9],   // left elbow to left wrist
    [6, 8],   // right shoulder to right elbow
    [8, 10],  // right elbow to right wrist
    [5, 11],  // left shoulder to left hip
    [6, 12],  // right shoulder to right hip
    [11, 12], // left hip to right hip
    [11, 13], // left hip to left knee
    [13, 15], // left knee to left ankle
    [12, 14], // right hip to right knee
    [14, 16], // right knee to right ankle
];

/// The shoulder-to-shoulder bone in [`SKELETON`].
pub const SHOULDER_LINE: [usize; 2] = [5, 6];

/// Color for a bone: the shoulder line has its own color, every other bone
/// takes the color of its first endpoint.
#[must_use]
pub fn bone_color(bone: [usize; 2]) -> Color {
    if is_shoulder_line(bone) {
        SHOULDER_LINE_COLOR
    } else {
        Color::from_joint_index(bone[0])
    }
}

/// Connections are unordered, so `[6, 5]` is the shoulder line too.
fn is_shoulder_line(bone: [usize; 2]) -> bool {
    bone == SHOULDER_LINE || bone == [SHOULDER_LINE[1], SHOULDER_LINE[0]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::NUM_KEYPOINTS;

    #[test]
    fn test_skeleton_indices_in_range() {
        for [a, b] in SKELETON {
            assert!(a < NUM_KEYPOINTS && b < NUM_KEYPOINTS);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_bone_colors() {
        assert_eq!(bone_color([5, 6]), SHOULDER_LINE_COLOR);
        assert_eq!(bone_color([6, 5]), SHOULDER_LINE_COLOR);
        assert_eq!(bone_color([13, 15]), Color::from_joint_index(13));
    }
}
