//! CLI commands for Chorus.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Classify an edit between two prompt files.
pub mod classify;

/// Shell completion script generation.
pub mod completions;

/// Configuration viewing and management.
pub mod config;

/// Export every tracked prompt to a JSON file.
pub mod export;

/// Show the latest version of a function's prompt.
pub mod latest;

/// List tracked prompt versions.
pub mod list;

/// Show or set the project version.
pub mod project;

/// Show a single prompt version.
pub mod show;

/// List snapshot files in the storage directory.
pub mod snapshots;
