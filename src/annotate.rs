// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Skeleton overlay rendering.
//!
//! A pose is drawn onto a canvas of fixed height whose width follows the
//! source image's aspect ratio. Keypoint coordinates live in source image
//! space and are mapped onto the canvas with independent x/y scale factors.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::filter::gaussian_blur_f32;

use crate::error::{PoseError, Result};
use crate::keypoints::{Keypoint, Pose};
use crate::visualizer::Color;
use crate::visualizer::skeleton::{SKELETON, bone_color};

/// Default canvas height in pixels.
pub const DISPLAY_HEIGHT: u32 = 300;

/// Configuration for skeleton rendering.
///
/// # Example
///
/// ```rust
/// use ultralytics_pose_compare::RenderConfig;
///
/// let config = RenderConfig::new()
///     .with_display_height(300)
///     .with_joint_radius(5)
///     .with_glow(4.0, 0.8);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas height in pixels.
    pub display_height: u32,
    /// Bone stroke width in pixels.
    pub line_width: u32,
    /// Radius of the disc drawn at each valid keypoint.
    pub joint_radius: i32,
    /// Standard deviation of the glow blur. `0` disables the glow.
    pub glow_sigma: f32,
    /// Weight of the glow layer when blended onto the background (0.0 to 1.0).
    pub glow_strength: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_height: DISPLAY_HEIGHT,
            line_width: 3,
            joint_radius: 5,
            glow_sigma: 4.0,
            glow_strength: 0.8,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas height.
    #[must_use]
    pub const fn with_display_height(mut self, height: u32) -> Self {
        self.display_height = height;
        self
    }

    /// Set the bone stroke width.
    #[must_use]
    pub const fn with_line_width(mut self, width: u32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the keypoint disc radius.
    #[must_use]
    pub const fn with_joint_radius(mut self, radius: i32) -> Self {
        self.joint_radius = radius;
        self
    }

    /// Set the glow blur and blend weight.
    #[must_use]
    pub const fn with_glow(mut self, sigma: f32, strength: f32) -> Self {
        self.glow_sigma = sigma;
        self.glow_strength = strength;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::ConfigError`] for a zero display height, a
    /// negative or non-finite glow sigma, or a glow strength outside `0..=1`.
    pub fn validate(&self) -> Result<()> {
        if self.display_height == 0 {
            return Err(PoseError::ConfigError(
                "display height must be greater than 0".to_string(),
            ));
        }
        if !self.glow_sigma.is_finite() || self.glow_sigma < 0.0 {
            return Err(PoseError::ConfigError(format!(
                "glow sigma must be a non-negative number, got {}",
                self.glow_sigma
            )));
        }
        if !(0.0..=1.0).contains(&self.glow_strength) {
            return Err(PoseError::ConfigError(format!(
                "glow strength must be between 0 and 1, got {}",
                self.glow_strength
            )));
        }
        Ok(())
    }
}

/// Canvas dimensions for an image of the given size.
///
/// Height is fixed; width preserves the image's aspect ratio. Degenerate
/// images produce an empty canvas.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn canvas_size(image_width: u32, image_height: u32, display_height: u32) -> (u32, u32) {
    if image_width == 0 || image_height == 0 {
        return (0, 0);
    }
    let aspect = f64::from(image_width) / f64::from(image_height);
    let width = (f64::from(display_height) * aspect).round() as u32;
    (width, display_height)
}

/// Mapping from image space to canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasScale {
    /// `canvas_width / image_width`.
    pub x: f32,
    /// `canvas_height / image_height`.
    pub y: f32,
}

impl CanvasScale {
    /// Scale factors between an image and a canvas.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(image: (u32, u32), canvas: (u32, u32)) -> Self {
        if image.0 == 0 || image.1 == 0 {
            return Self { x: 0.0, y: 0.0 };
        }
        Self {
            x: canvas.0 as f32 / image.0 as f32,
            y: canvas.1 as f32 / image.1 as f32,
        }
    }

    /// Canvas position of a keypoint.
    #[must_use]
    pub fn apply(&self, kp: &Keypoint) -> (f32, f32) {
        (kp.x * self.x, kp.y * self.y)
    }
}

/// Draw `pose` over `image` into `canvas`.
///
/// The canvas is replaced with one sized by [`canvas_size`]. With
/// `show_image` off the background is solid black so the skeleton can be
/// inspected alone. Bones are drawn only when both endpoints are valid, then
/// every valid keypoint is drawn as a disc. Rendering the same inputs again
/// yields an identical canvas.
pub fn render_pose(
    canvas: &mut RgbImage,
    pose: &Pose,
    image: &DynamicImage,
    show_image: bool,
    config: &RenderConfig,
) {
    let (img_w, img_h) = image.dimensions();
    let (width, height) = canvas_size(img_w, img_h, config.display_height);
    if width == 0 || height == 0 {
        *canvas = RgbImage::new(width, height);
        return;
    }

    *canvas = if show_image {
        imageops::resize(&image.to_rgb8(), width, height, FilterType::Triangle)
    } else {
        RgbImage::from_pixel(width, height, Color::BLACK.to_rgb())
    };

    let scale = CanvasScale::new((img_w, img_h), (width, height));

    if config.glow_sigma > 0.0 && config.glow_strength > 0.0 {
        let mut strokes = RgbImage::new(width, height);
        draw_skeleton(&mut strokes, pose, scale, config);
        let glow = gaussian_blur_f32(&strokes, config.glow_sigma);
        blend_additive(canvas, &glow, config.glow_strength);
    }

    draw_skeleton(canvas, pose, scale, config);
}

/// Convenience wrapper around [`render_pose`] returning a fresh canvas.
#[must_use]
pub fn draw_pose(
    pose: &Pose,
    image: &DynamicImage,
    show_image: bool,
    config: &RenderConfig,
) -> RgbImage {
    let mut canvas = RgbImage::new(0, 0);
    render_pose(&mut canvas, pose, image, show_image, config);
    canvas
}

/// Place two canvases next to each other, top aligned, with a black gap.
#[must_use]
pub fn side_by_side(left: &RgbImage, right: &RgbImage, gap: u32) -> RgbImage {
    let width = left.width() + gap + right.width();
    let height = left.height().max(right.height());
    let mut out = RgbImage::new(width, height);
    imageops::replace(&mut out, left, 0, 0);
    imageops::replace(&mut out, right, i64::from(left.width() + gap), 0);
    out
}

/// Bones first, then joints on top.
fn draw_skeleton(canvas: &mut RgbImage, pose: &Pose, scale: CanvasScale, config: &RenderConfig) {
    let keypoints = pose.keypoints();

    for bone in SKELETON {
        let (a, b) = (&keypoints[bone[0]], &keypoints[bone[1]]);
        if !(a.is_valid() && b.is_valid()) {
            continue;
        }
        draw_thick_line(
            canvas,
            scale.apply(a),
            scale.apply(b),
            config.line_width,
            bone_color(bone),
        );
    }

    for (i, kp) in keypoints.iter().enumerate() {
        if !kp.is_valid() {
            continue;
        }
        let (x, y) = scale.apply(kp);
        draw_filled_circle_mut(
            canvas,
            to_pixel(x, y),
            config.joint_radius,
            Color::from_joint_index(i).to_rgb(),
        );
    }
}

/// Stroke a segment with round caps by stamping discs along it.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn draw_thick_line(canvas: &mut RgbImage, from: (f32, f32), to: (f32, f32), width: u32, color: Color) {
    let radius = (width / 2) as i32;
    let pad = radius as f32 + 1.0;
    let bounds = (
        -pad,
        -pad,
        canvas.width() as f32 + pad,
        canvas.height() as f32 + pad,
    );
    let Some((from, to)) = clip_segment(from, to, bounds) else {
        return;
    };
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    let steps = (length.ceil() as u32).max(1);
    let rgb = color.to_rgb();

    for s in 0..=steps {
        let t = s as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        draw_filled_circle_mut(canvas, to_pixel(x, y), radius, rgb);
    }
}

/// Clip a segment to the rectangle `(min_x, min_y, max_x, max_y)`
/// (Liang-Barsky). `None` if no part of it lies inside.
#[allow(clippy::float_cmp)]
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    (min_x, min_y, max_x, max_y): (f32, f32, f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-dx, from.0 - min_x),
        (dx, max_x - from.0),
        (-dy, from.1 - min_y),
        (dy, max_y - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (from.0 + dx * t0, from.1 + dy * t0),
        (from.0 + dx * t1, from.1 + dy * t1),
    ))
}

/// Far off-canvas points are pulled in so disc arithmetic cannot overflow.
const PIXEL_LIMIT: f32 = 1_000_000.0;

#[allow(clippy::cast_possible_truncation)]
fn to_pixel(x: f32, y: f32) -> (i32, i32) {
    (
        x.clamp(-PIXEL_LIMIT, PIXEL_LIMIT).round() as i32,
        y.clamp(-PIXEL_LIMIT, PIXEL_LIMIT).round() as i32,
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_additive(canvas: &mut RgbImage, glow: &RgbImage, strength: f32) {
    for (dst, src) in canvas.pixels_mut().zip(glow.pixels()) {
        for c in 0..3 {
            let value = f32::from(dst[c]) + f32::from(src[c]) * strength;
            dst[c] = value.round().min(255.0) as u8;
        }
    }
}
