// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Saving rendered comparisons to disk.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Serialize;

use crate::error::{PoseError, Result};

/// Find the next available run directory (compare, compare2, compare3, etc.)
#[must_use]
pub fn find_next_run_dir(base: impl AsRef<Path>, prefix: &str) -> PathBuf {
    let base_path = base.as_ref();

    let first = base_path.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base_path.join(format!("{prefix}{i}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Writes canvases and score reports into one run directory.
#[derive(Debug, Clone)]
pub struct SaveResults {
    save_dir: PathBuf,
}

impl SaveResults {
    /// Create a saver for `save_dir`. The directory is created on first save.
    #[must_use]
    pub fn new(save_dir: PathBuf) -> Self {
        Self { save_dir }
    }

    /// Directory results are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.save_dir
    }

    /// Save a canvas as `file_name` (format chosen by extension).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the image
    /// cannot be encoded.
    pub fn save_canvas(&self, file_name: &str, canvas: &RgbImage) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.save_dir.join(file_name);
        canvas
            .save(&path)
            .map_err(|e| PoseError::Io(std::io::Error::other(format!("{}: {e}", path.display()))))?;
        Ok(path)
    }

    /// Save any serializable report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.save_dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.save_dir.exists() {
            fs::create_dir_all(&self.save_dir)?;
        }
        Ok(())
    }
}
