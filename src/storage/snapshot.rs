//! Snapshot file format.
//!
//! A snapshot is a JSON object mapping `{owner}_{version}` to a record.
//! The object keys are only informational: on read, each record is
//! re-keyed from its own `function_name` and `version` fields.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::models::{RecordKey, VersionRecord};

/// Borrowed view of an index, serialized as a snapshot object.
struct SnapshotRef<'a>(&'a BTreeMap<RecordKey, VersionRecord>);

impl Serialize for SnapshotRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, record)| (key.storage_key(), record)))
    }
}

/// All records of a snapshot in file order.
struct SnapshotRecords(Vec<VersionRecord>);

impl<'de> Deserialize<'de> for SnapshotRecords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordsVisitor;

        impl<'de> Visitor<'de> for RecordsVisitor {
            type Value = SnapshotRecords;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping record keys to prompt records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_, record)) = map.next_entry::<IgnoredAny, VersionRecord>()? {
                    records.push(record);
                }
                Ok(SnapshotRecords(records))
            }
        }

        deserializer.deserialize_map(RecordsVisitor)
    }
}

/// Renders an index as pretty-printed snapshot JSON.
pub fn to_json(index: &BTreeMap<RecordKey, VersionRecord>) -> Result<String> {
    serde_json::to_string_pretty(&SnapshotRef(index)).context("Failed to serialize snapshot")
}

/// Parses snapshot JSON into an index. Later entries win on duplicate keys.
///
/// Any malformed record fails the whole snapshot.
pub fn from_json(json: &str) -> Result<BTreeMap<RecordKey, VersionRecord>> {
    let SnapshotRecords(records) =
        serde_json::from_str(json).context("Failed to parse snapshot")?;
    Ok(records
        .into_iter()
        .map(|record| (record.key(), record))
        .collect())
}

/// Writes an index to `path`, replacing any existing file.
///
/// The write is not atomic; a crash part way through can leave a
/// truncated file behind.
pub fn write(path: &Path, index: &BTreeMap<RecordKey, VersionRecord>) -> Result<()> {
    let json = to_json(index)?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot {}", path.display()))
}

/// Reads the index stored at `path`.
pub fn read(path: &Path) -> Result<BTreeMap<RecordKey, VersionRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    from_json(&json).with_context(|| format!("Invalid snapshot {}", path.display()))
}
