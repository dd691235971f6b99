// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tables and tools for pose overlays.

/// Color definitions and palettes.
pub mod color;

/// Skeleton connection table.
pub mod skeleton;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::Color;
pub use skeleton::SKELETON;

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
