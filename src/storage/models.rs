//! Core data models for Chorus
//!
//! A [`VersionRecord`] is one versioned prompt together with the trace of
//! the call that produced it. Records are immutable: a changed prompt is
//! stored as a new record under a new [`RecordKey`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::versioning::{self, VersionError};

/// Identity of a record in the store: the owning unit plus its version.
///
/// Kept as a pair rather than a joined string so owner names containing
/// `_` cannot collide with other owner/version combinations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub owner: String,
    pub version: String,
}

impl RecordKey {
    pub fn new(owner: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            version: version.into(),
        }
    }

    /// The `{owner}_{version}` form used as the object key in snapshot files.
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.owner, self.version)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.owner, self.version)
    }
}

/// Short content hash of a prompt: the first 8 hex digits of its SHA-256.
///
/// Used for display IDs only; collisions are possible.
pub fn prompt_hash(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..4])
}

/// A versioned prompt and the last execution recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord")]
pub struct VersionRecord {
    /// The fully formatted prompt at capture time
    #[serde(rename = "prompt")]
    prompt: String,

    /// Semantic version of the prompt
    version: String,

    /// The tracked function or unit this prompt belongs to
    #[serde(rename = "function_name")]
    owner: String,

    description: String,

    tags: BTreeSet<String>,

    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,

    /// Always derived from `prompt`
    prompt_hash: String,

    /// Arguments bound at call time
    inputs: BTreeMap<String, serde_json::Value>,

    /// Return value, or an `ERROR: ...` marker when the call failed
    output: Option<serde_json::Value>,

    /// Wall-clock duration of the call in seconds
    #[serde(rename = "execution_time")]
    execution_time: Option<f64>,

    execution_id: String,
}

impl VersionRecord {
    /// Starts building a record for `owner` at `version`.
    pub fn builder(
        prompt: impl Into<String>,
        version: impl Into<String>,
        owner: impl Into<String>,
    ) -> RecordBuilder {
        RecordBuilder {
            prompt: prompt.into(),
            version: version.into(),
            owner: owner.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            created_at: None,
            inputs: BTreeMap::new(),
            output: None,
            execution_time: None,
            execution_id: None,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.owner.clone(), self.version.clone())
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    pub fn inputs(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.inputs
    }

    pub fn output(&self) -> Option<&serde_json::Value> {
        self.output.as_ref()
    }

    pub fn execution_time(&self) -> Option<f64> {
        self.execution_time
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }
}

/// Builder for [`VersionRecord`]; the version is validated in [`RecordBuilder::build`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    prompt: String,
    version: String,
    owner: String,
    description: String,
    tags: BTreeSet<String>,
    created_at: Option<DateTime<Utc>>,
    inputs: BTreeMap<String, serde_json::Value>,
    output: Option<serde_json::Value>,
    execution_time: Option<f64>,
    execution_id: Option<String>,
}

impl RecordBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn inputs(mut self, inputs: BTreeMap<String, serde_json::Value>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn input(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.inputs.insert(name.into(), value);
        self
    }

    /// Sets the call output. A JSON `null` is treated as no output.
    pub fn output(mut self, output: serde_json::Value) -> Self {
        self.output = (!output.is_null()).then_some(output);
        self
    }

    pub fn execution_time(mut self, seconds: f64) -> Self {
        self.execution_time = Some(seconds);
        self
    }

    pub fn execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    /// Finishes the record.
    ///
    /// Fails if the version is not a valid semantic version. The creation
    /// time defaults to now and the execution ID to
    /// `{created_at:YYYYMMDD_HHMMSS}_{prompt_hash}`.
    pub fn build(self) -> Result<VersionRecord, VersionError> {
        versioning::validate(&self.version)?;

        let created_at = self.created_at.unwrap_or_else(Utc::now);
        let prompt_hash = prompt_hash(&self.prompt);
        let execution_id = self.execution_id.unwrap_or_else(|| {
            format!("{}_{}", created_at.format("%Y%m%d_%H%M%S"), prompt_hash)
        });

        Ok(VersionRecord {
            prompt: self.prompt,
            version: self.version,
            owner: self.owner,
            description: self.description,
            tags: self.tags,
            created_at,
            prompt_hash,
            inputs: self.inputs,
            output: self.output,
            execution_time: self.execution_time,
            execution_id,
        })
    }
}

/// On-disk shape of a record. The stored hash is ignored and recomputed.
#[derive(Deserialize)]
struct StoredRecord {
    prompt: String,
    version: String,
    function_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: BTreeSet<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    inputs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    execution_time: Option<f64>,
    #[serde(default)]
    execution_id: Option<String>,
}

impl TryFrom<StoredRecord> for VersionRecord {
    type Error = VersionError;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        let mut builder = VersionRecord::builder(stored.prompt, stored.version, stored.function_name)
            .description(stored.description)
            .tags(stored.tags)
            .created_at(stored.created_at)
            .inputs(stored.inputs);
        if let Some(output) = stored.output {
            builder = builder.output(output);
        }
        if let Some(seconds) = stored.execution_time {
            builder = builder.execution_time(seconds);
        }
        if let Some(id) = stored.execution_id {
            builder = builder.execution_id(id);
        }
        builder.build()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps are written as RFC 3339. Older files carry naive ISO-8601
/// local times without an offset; those are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_record() -> VersionRecord {
        VersionRecord::builder("Summarize: hello", "1.2.0", "summarize")
            .description("Summaries")
            .tags(["nlp", "summary"])
            .created_at(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 9).unwrap())
            .input("text", json!("hello"))
            .input("limit", json!(3))
            .output(json!({"summary": "hi"}))
            .execution_time(0.25)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prompt_hash_is_short_and_deterministic() {
        let a = prompt_hash("You are a helpful assistant.");
        let b = prompt_hash("You are a helpful assistant.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, prompt_hash("You are a helpful assistant!"));
    }

    #[test]
    fn test_prompt_hash_known_value() {
        // sha256("") = e3b0c442...
        assert_eq!(prompt_hash(""), "e3b0c442");
    }

    #[test]
    fn test_builder_defaults() {
        let record = VersionRecord::builder("p", "1.0.0", "f").build().unwrap();
        assert_eq!(record.description(), "");
        assert!(record.tags().is_empty());
        assert!(record.inputs().is_empty());
        assert!(record.output().is_none());
        assert!(record.execution_time().is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_version() {
        let err = VersionRecord::builder("p", "1.0", "f").build().unwrap_err();
        assert_eq!(err, VersionError::Invalid("1.0".to_string()));
    }

    #[test]
    fn test_default_execution_id() {
        let record = sample_record();
        assert_eq!(
            record.execution_id(),
            format!("20240305_143009_{}", record.prompt_hash())
        );
    }

    #[test]
    fn test_explicit_execution_id_is_kept() {
        let record = VersionRecord::builder("p", "1.0.0", "f")
            .execution_id("run-42")
            .build()
            .unwrap();
        assert_eq!(record.execution_id(), "run-42");
    }

    #[test]
    fn test_null_output_is_none() {
        let record = VersionRecord::builder("p", "1.0.0", "f")
            .output(serde_json::Value::Null)
            .build()
            .unwrap();
        assert!(record.output().is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "prompt",
            "version",
            "function_name",
            "description",
            "tags",
            "created_at",
            "prompt_hash",
            "inputs",
            "output",
            "execution_time",
            "execution_id",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert_eq!(object.len(), 11);
        assert_eq!(value["function_name"], "summarize");
        assert_eq!(value["tags"], json!(["nlp", "summary"]));
    }

    #[test]
    fn test_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let restored: VersionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.prompt(), record.prompt());
        assert_eq!(restored.version(), record.version());
        assert_eq!(restored.owner(), record.owner());
        assert_eq!(restored.tags(), record.tags());
        assert_eq!(restored.inputs(), record.inputs());
        assert_eq!(restored.output(), record.output());
        assert_eq!(restored.execution_time(), record.execution_time());
        assert_eq!(restored.prompt_hash(), prompt_hash(restored.prompt()));
        assert_eq!(restored, record);
    }

    #[test]
    fn test_stored_hash_is_recomputed() {
        let data = json!({
            "prompt": "Hello",
            "version": "1.0.0",
            "function_name": "greet",
            "created_at": "2024-01-01T00:00:00Z",
            "prompt_hash": "deadbeef",
        });
        let record: VersionRecord = serde_json::from_value(data).unwrap();
        assert_eq!(record.prompt_hash(), prompt_hash("Hello"));
    }

    #[test]
    fn test_legacy_record_with_nulls_and_naive_time() {
        let data = json!({
            "prompt": "Hello {name}",
            "version": "1.0.0",
            "function_name": "greet",
            "description": null,
            "tags": null,
            "created_at": "2024-01-01T12:30:45.123456",
            "inputs": null,
            "output": null,
            "execution_time": null,
            "execution_id": null,
        });
        let record: VersionRecord = serde_json::from_value(data).unwrap();
        assert_eq!(record.description(), "");
        assert!(record.tags().is_empty());
        assert!(record.inputs().is_empty());
        assert!(record.output().is_none());
        assert_eq!(
            record.created_at(),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 45).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
        assert!(record.execution_id().starts_with("20240101_123045_"));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let data = json!({
            "prompt": "Hello",
            "version": "1.0.0",
            "created_at": "2024-01-01T00:00:00Z",
        });
        let err = serde_json::from_value::<VersionRecord>(data).unwrap_err();
        assert!(err.to_string().contains("function_name"));
    }

    #[test]
    fn test_invalid_stored_version_fails() {
        let data = json!({
            "prompt": "Hello",
            "version": "one",
            "function_name": "greet",
            "created_at": "2024-01-01T00:00:00Z",
        });
        assert!(serde_json::from_value::<VersionRecord>(data).is_err());
    }

    #[test]
    fn test_record_key_storage_key() {
        let key = RecordKey::new("my_fn", "1.0.0");
        assert_eq!(key.storage_key(), "my_fn_1.0.0");
        assert_eq!(key.to_string(), "my_fn v1.0.0");
        assert_ne!(RecordKey::new("a_b", "1.0.0"), RecordKey::new("a", "b_1.0.0"));
    }
}
