// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Window for inspecting comparison overlays.

use image::DynamicImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{PoseError, Result};

/// A simple image viewer using minifb.
pub struct Viewer {
    window: Window,
    pub width: usize,
    pub height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::VisualizerError`] if the window cannot be opened.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| PoseError::VisualizerError(format!("Failed to create window: {e}")))?;

        window.set_target_fps(30);

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    fn should_close(&self) -> bool {
        !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
    }

    /// Show an image. Returns `false` once the user closed the window.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::VisualizerError`] if the window cannot be updated.
    pub fn update(&mut self, image: &DynamicImage) -> Result<bool> {
        if self.should_close() {
            return Ok(false);
        }

        let rgb = image.to_rgb8();
        self.width = rgb.width() as usize;
        self.height = rgb.height() as usize;
        // minifb expects 0x00RRGGBB per pixel
        self.buffer = rgb
            .pixels()
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect();

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| PoseError::VisualizerError(format!("Failed to update window: {e}")))?;
        Ok(true)
    }

    /// Keep the window responsive for `duration`. Returns `false` once closed.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::VisualizerError`] if the window cannot be updated.
    pub fn wait(&mut self, duration: std::time::Duration) -> Result<bool> {
        let start = std::time::Instant::now();
        while start.elapsed() < duration {
            if self.should_close() {
                return Ok(false);
            }
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| PoseError::VisualizerError(format!("Failed to update window: {e}")))?;
        }
        Ok(true)
    }
}
