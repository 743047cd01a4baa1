//! Project version registry.
//!
//! `project_version.json` in the storage root maps each scope label to
//! the project version set for it. The project version is set by hand and
//! is independent of the per-prompt versions.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::store::RecordStore;
use crate::versioning;

/// File holding the scope → project version map.
pub const PROJECT_VERSION_FILE: &str = "project_version.json";

impl RecordStore {
    fn project_version_path(&self) -> PathBuf {
        self.root().join(PROJECT_VERSION_FILE)
    }

    /// Records `version` as this scope's project version.
    ///
    /// The version is validated before anything is written.
    pub fn set_project_version(&self, version: &str) -> Result<()> {
        let version = versioning::validate(version)?.trim();

        let mut versions = self.all_project_versions();
        versions.insert(self.scope().to_string(), version.to_string());

        let path = self.project_version_path();
        let json = serde_json::to_string_pretty(&versions)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// This scope's project version, if one has been set.
    pub fn project_version(&self) -> Option<String> {
        self.all_project_versions().remove(self.scope())
    }

    /// Project versions of every scope sharing this storage root.
    ///
    /// A missing or malformed file reads as empty.
    pub fn all_project_versions(&self) -> BTreeMap<String, String> {
        let path = self.project_version_path();
        let Ok(json) = fs::read_to_string(&path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            BTreeMap::new()
        })
    }
}
