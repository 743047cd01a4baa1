//! File-backed store of prompt versions.
//!
//! The store keeps an in-memory index of every record and persists the
//! whole index on each [`RecordStore::add`]: once to a new timestamped
//! snapshot (`prompts_{scope}_{YYYYMMDD_HHMMSS}.json`) and once to the
//! legacy `prompts.json` mirror. Snapshots accumulate; nothing is ever
//! deleted.
//!
//! The index is read from disk only when the store is opened. Writes made
//! by other store instances afterwards are not observed.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Local;

use super::export::ExportDocument;
use super::models::{RecordKey, VersionRecord};
use super::snapshot;
use crate::config::Config;
use crate::versioning::{parse_parts, VersionNumber};

/// Fixed-name snapshot kept in sync with the latest index.
pub const LEGACY_SNAPSHOT_FILE: &str = "prompts.json";

/// Glob matching every timestamped snapshot, whatever its scope.
const SNAPSHOT_GLOB: &str = "prompts_*.json";

const SNAPSHOT_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Versioned prompt records for one storage root.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    scope: String,
    records: BTreeMap<RecordKey, VersionRecord>,
}

impl RecordStore {
    /// Opens the store at `root`, creating the directory if needed.
    ///
    /// `scope` labels the snapshot files this instance writes. The index is
    /// loaded from the newest snapshot of any scope, falling back to the
    /// legacy file and then to an empty index; unreadable files are logged
    /// and skipped rather than reported as errors.
    pub fn open(root: impl Into<PathBuf>, scope: impl Into<String>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create storage directory {}", root.display()))?;

        let mut store = Self {
            root,
            scope: scope.into(),
            records: BTreeMap::new(),
        };
        store.records = store.load_index();
        Ok(store)
    }

    /// Opens the store described by a configuration.
    pub fn open_with(config: &Config) -> Result<Self> {
        Self::open(&config.storage_path, &config.scope)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn legacy_path(&self) -> PathBuf {
        self.root.join(LEGACY_SNAPSHOT_FILE)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn load_index(&self) -> BTreeMap<RecordKey, VersionRecord> {
        let snapshots = self.snapshot_files().unwrap_or_else(|e| {
            tracing::warn!("Could not list snapshots in {}: {:#}", self.root.display(), e);
            Vec::new()
        });

        if let Some(latest) = snapshots.first() {
            match snapshot::read(latest) {
                Ok(index) => {
                    tracing::debug!("Loaded {} records from {}", index.len(), latest.display());
                    return index;
                }
                Err(e) => {
                    tracing::warn!("Could not load latest snapshot {}: {:#}", latest.display(), e)
                }
            }
        }

        let legacy = self.legacy_path();
        if legacy.exists() {
            match snapshot::read(&legacy) {
                Ok(index) => {
                    tracing::debug!("Loaded {} records from {}", index.len(), legacy.display());
                    return index;
                }
                Err(e) => tracing::warn!("Could not load legacy file {}: {:#}", legacy.display(), e),
            }
        }

        BTreeMap::new()
    }

    /// Adds a record, replacing any record with the same owner and version,
    /// and persists the full index.
    ///
    /// Returns the path of the snapshot written.
    pub fn add(&mut self, record: VersionRecord) -> Result<PathBuf> {
        let key = record.key();
        tracing::debug!("Storing {}", key);
        self.records.insert(key, record);
        self.commit()
    }

    /// Writes the index to a new timestamped snapshot, then mirrors it to
    /// the legacy file.
    ///
    /// The two writes are not a transaction. If the process dies between
    /// them, the legacy file lags the newest snapshot by one commit; readers
    /// prefer the snapshot, so only legacy-only readers see the older view.
    fn commit(&self) -> Result<PathBuf> {
        let path = self.root.join(self.snapshot_file_name());
        snapshot::write(&path, &self.records)?;
        snapshot::write(&self.legacy_path(), &self.records)?;
        Ok(path)
    }

    /// File name for a snapshot written now by this store.
    pub fn snapshot_file_name(&self) -> String {
        format!(
            "prompts_{}_{}.json",
            sanitize_scope(&self.scope),
            Local::now().format(SNAPSHOT_TIME_FORMAT)
        )
    }

    /// Exact lookup by owner and version.
    pub fn get(&self, owner: &str, version: &str) -> Option<&VersionRecord> {
        self.records.get(&RecordKey::new(owner, version))
    }

    /// The owner's record with the greatest trailing version component.
    ///
    /// Ties go to the most recently created record, then to the greater
    /// semantic version.
    pub fn latest_by_recency(&self, owner: &str) -> Option<&VersionRecord> {
        self.records_for(owner).into_iter().max_by(|a, b| {
            recency_tag(a.version())
                .cmp(&recency_tag(b.version()))
                .then_with(|| a.created_at().cmp(&b.created_at()))
                .then_with(|| compare_semver(a, b))
        })
    }

    /// The owner's record with the greatest `(major, minor, patch)`.
    ///
    /// Versions differing only in pre-release or build metadata tie; the
    /// most recently created of them wins.
    pub fn latest_by_semver(&self, owner: &str) -> Option<&VersionRecord> {
        self.records_for(owner).into_iter().max_by(|a, b| {
            compare_semver(a, b).then_with(|| a.created_at().cmp(&b.created_at()))
        })
    }

    /// All records, or only those belonging to `owner`.
    pub fn list(&self, owner: Option<&str>) -> Vec<&VersionRecord> {
        match owner {
            Some(owner) => self.records_for(owner),
            None => self.records.values().collect(),
        }
    }

    /// Distinct owner names, sorted.
    pub fn owners(&self) -> Vec<&str> {
        let mut owners: Vec<&str> = self.records.keys().map(|k| k.owner.as_str()).collect();
        owners.dedup();
        owners
    }

    fn records_for(&self, owner: &str) -> Vec<&VersionRecord> {
        self.records.values().filter(|r| r.owner() == owner).collect()
    }

    /// Timestamped snapshot files in the storage root, newest first.
    pub fn snapshot_files(&self) -> Result<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&escaped_root)
            .join(SNAPSHOT_GLOB)
            .to_string_lossy()
            .into_owned();

        let mut files: Vec<(SystemTime, PathBuf)> = glob::glob(&pattern)
            .with_context(|| format!("Invalid snapshot pattern {pattern}"))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .map(|path| {
                let modified = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, path)
            })
            .collect();

        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }

    /// Every record wrapped in an export envelope.
    pub fn export(&self) -> ExportDocument<'_> {
        ExportDocument::new(self.records.values().collect())
    }
}

/// The last numeric component of a version's core, e.g. `3` for `1.2.3`.
fn recency_tag(version: &str) -> VersionNumber {
    parse_parts(version).patch
}

fn compare_semver(a: &VersionRecord, b: &VersionRecord) -> Ordering {
    parse_parts(a.version()).cmp(&parse_parts(b.version()))
}

/// Keeps scope labels usable as part of a file name.
fn sanitize_scope(scope: &str) -> String {
    let cleaned: String = scope
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "run".to_string()
    } else {
        cleaned
    }
}
