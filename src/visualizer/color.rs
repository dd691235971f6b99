// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use image::Rgb;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Create a new color from RGB values.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Get the color assigned to a joint by its COCO keypoint index.
    ///
    /// Indices past the table wrap around.
    pub fn from_joint_index(index: usize) -> Self {
        let color = JOINT_COLORS[index % JOINT_COLORS.len()];
        Self(color[0], color[1], color[2])
    }

    /// Convert to an opaque `image` RGB pixel.
    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.0, self.1, self.2])
    }
}

/// Color of the shoulder-to-shoulder bone, which is always drawn in this
/// color regardless of its endpoints.
pub const SHOULDER_LINE_COLOR: Color = Color::WHITE;

/// Per-joint color table, indexed by COCO keypoint index.
pub const JOINT_COLORS: [[u8; 3]; 17] = [
    [255, 0, 0],     // #ff0000 nose
    [255, 85, 0],    // #ff5500 left_eye
    [255, 170, 0],   // #ffaa00 right_eye
    [255, 255, 0],   // #ffff00 left_ear
    [170, 255, 0],   // #aaff00 right_ear
    [85, 255, 0],    // #55ff00 left_shoulder
    [0, 255, 0],     // #00ff00 right_shoulder
    [0, 255, 85],    // #00ff55 left_elbow
    [0, 255, 170],   // #00ffaa right_elbow
    [0, 255, 255],   // #00ffff left_wrist
    [0, 170, 255],   // #00aaff right_wrist
    [0, 85, 255],    // #0055ff left_hip
    [0, 0, 255],     // #0000ff right_hip
    [85, 0, 255],    // #5500ff left_knee
    [170, 0, 255],   // #aa00ff right_knee
    [255, 0, 255],   // #ff00ff left_ankle
    [255, 0, 170],   // #ff00aa right_ankle
];
