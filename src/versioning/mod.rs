//! Semantic versioning for prompts.
//!
//! Two halves live here: the version codec (parsing, validation, and
//! bump arithmetic on `MAJOR.MINOR.PATCH` strings) and the change
//! classifier that looks at an old and a new prompt and decides which
//! component of the version an edit should bump.

pub mod classify;
pub mod semver;

pub use classify::{analyze_change, classify_change, ChangeAnalysis, ChangeTrigger};
pub use semver::{bump, is_valid, parse_parts, BumpKind, VersionNumber, VersionParts};

/// Errors raised when a version string is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    /// No version was supplied at all.
    #[error("Version is required and cannot be empty")]
    Empty,

    /// The version does not match `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
    #[error("Invalid version format: {0}. Expected a semantic version such as '1.0.0'")]
    Invalid(String),
}

/// Validates a version string, returning it unchanged when it is well formed.
pub fn validate(version: &str) -> Result<&str, VersionError> {
    if version.trim().is_empty() {
        return Err(VersionError::Empty);
    }
    if !is_valid(version) {
        return Err(VersionError::Invalid(version.to_string()));
    }
    Ok(version)
}
