// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for comparing poses.
//!
//! This module contains the command-line interface logic, including argument parsing
//! and the `compare`, `score` and `render` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Comparison, scoring and rendering commands.
pub mod compare;

/// Console logging macros and verbosity flag.
pub mod logging;
