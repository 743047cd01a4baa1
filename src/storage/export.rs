//! Export of the full record set as a single JSON document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::VersionRecord;

/// Envelope written by `chorus export`.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub exported_at: DateTime<Utc>,
    pub total_prompts: usize,
    pub prompts: Vec<&'a VersionRecord>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(prompts: Vec<&'a VersionRecord>) -> Self {
        Self {
            exported_at: Utc::now(),
            total_prompts: prompts.len(),
            prompts,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export")
    }

    /// Writes the document to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write export {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_fields() {
        let a = VersionRecord::builder("a", "1.0.0", "f").build().unwrap();
        let b = VersionRecord::builder("b", "1.1.0", "f").build().unwrap();
        let doc = ExportDocument::new(vec![&a, &b]);

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["total_prompts"], 2);
        assert_eq!(value["prompts"].as_array().unwrap().len(), 2);
        assert_eq!(value["prompts"][1]["version"], "1.1.0");
        assert!(value["exported_at"].is_string());
    }

    #[test]
    fn test_empty_export() {
        let doc = ExportDocument::new(Vec::new());
        assert_eq!(doc.total_prompts, 0);
        assert!(doc.prompts.is_empty());
    }
}
