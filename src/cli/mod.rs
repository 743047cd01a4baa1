//! Command-line interface for Chorus.
//!
//! Provides the CLI commands for browsing tracked prompt versions,
//! exporting them, and classifying prompt edits.

/// Individual CLI command implementations.
pub mod commands;

mod format;

pub use format::{truncate_str, OutputFormat};
