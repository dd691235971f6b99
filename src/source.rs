// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image acquisition for comparison slots.
//!
//! Uploads arrive as raw bytes with a MIME type. Only `image/*` uploads are
//! accepted; everything else is rejected before decoding is attempted.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{PoseError, Result};

/// A file supplied for one slot, not yet decoded.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Display name (usually the file name).
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Location on disk, if the upload came from a file.
    pub path: Option<PathBuf>,
}

impl ImageUpload {
    /// Create an upload from in-memory bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
            path: None,
        }
    }

    /// Read an upload from disk, guessing the MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::FileReadFailure`] if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| PoseError::FileReadFailure(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());

        Ok(Self {
            name,
            mime: guess_mime(path).to_string(),
            bytes,
            path: Some(path.to_path_buf()),
        })
    }

    /// Validate the MIME type and decode the image.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::InvalidFileType`] for non-image MIME types and
    /// [`PoseError::ImageDecodeFailure`] if the bytes are not a readable image.
    pub fn decode(self) -> Result<LoadedImage> {
        validate_mime(&self.mime)?;
        let image = image::load_from_memory(&self.bytes)
            .map_err(|e| PoseError::ImageDecodeFailure(format!("{}: {e}", self.name)))?;
        Ok(LoadedImage {
            name: self.name,
            path: self.path,
            image,
        })
    }
}

/// A decoded image ready for pose estimation and rendering.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Display name.
    pub name: String,
    /// Location on disk, if known.
    pub path: Option<PathBuf>,
    /// Decoded pixels.
    pub image: DynamicImage,
}

impl LoadedImage {
    /// Wrap an already decoded image.
    #[must_use]
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            path: None,
            image,
        }
    }
}

/// Accept only MIME types in the `image/` family.
///
/// # Errors
///
/// Returns [`PoseError::InvalidFileType`] otherwise.
pub fn validate_mime(mime: &str) -> Result<()> {
    if mime.starts_with("image/") {
        Ok(())
    } else {
        Err(PoseError::InvalidFileType(if mime.is_empty() {
            "unknown".to_string()
        } else {
            mime.to_string()
        }))
    }
}

/// MIME type for a file based on its extension.
#[must_use]
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 4));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_validate_mime() {
        assert!(validate_mime("image/png").is_ok());
        assert!(validate_mime("image/jpeg").is_ok());
        assert!(matches!(
            validate_mime("text/plain"),
            Err(PoseError::InvalidFileType(_))
        ));
        assert!(validate_mime("").is_err());
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/b/pose.JPG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("pose.webp")), "image/webp");
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_decode_upload() {
        let loaded = ImageUpload::new("pose.png", "image/png", png_bytes())
            .decode()
            .unwrap();
        assert_eq!(loaded.name, "pose.png");
        assert_eq!((loaded.image.width(), loaded.image.height()), (8, 4));
    }

    #[test]
    fn test_decode_rejects_wrong_mime_before_decoding() {
        let err = ImageUpload::new("pose.png", "text/plain", png_bytes())
            .decode()
            .unwrap_err();
        assert!(matches!(err, PoseError::InvalidFileType(_)));
    }

    #[test]
    fn test_decode_garbage() {
        let err = ImageUpload::new("broken.png", "image/png", vec![1, 2, 3])
            .decode()
            .unwrap_err();
        assert!(matches!(err, PoseError::ImageDecodeFailure(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ImageUpload::from_path("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, PoseError::FileReadFailure(_)));
    }
}
