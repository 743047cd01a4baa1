//! Prompt tracking around calls.
//!
//! A [`Tracker`] wraps one call of a prompt-bearing function: it formats
//! the prompt template with the call's inputs, decides which version the
//! prompt should be stored under, times the call, and persists a
//! [`VersionRecord`] with the outcome. The caller always gets the call's own
//! result back, success or failure.
//!
//! Extracting the template from source code and capturing the arguments
//! are left to the host integration; this module receives them ready-made.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::sync::LazyLock;
use std::time::Instant;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use crate::storage::{RecordStore, VersionRecord};
use crate::versioning::{self, analyze_change, bump, VersionError};

/// Version assigned to the first record of an auto-versioned prompt.
pub const INITIAL_VERSION: &str = "1.0.0";

/// Output prefix recorded when the tracked call fails.
pub const ERROR_MARKER: &str = "ERROR: ";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is a valid regex")
});

/// How a tracked prompt picks its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Start at `1.0.0` and bump according to each change.
    Auto,
    /// Use the given version.
    Explicit(String),
}

impl VersionPolicy {
    /// Parses `"auto"` or a semantic version.
    ///
    /// Invalid versions are rejected here, before any storage is touched.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version == "auto" {
            return Ok(VersionPolicy::Auto);
        }
        versioning::validate(version).map(|v| VersionPolicy::Explicit(v.to_string()))
    }
}

/// Per-function tracking settings.
#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub policy: VersionPolicy,
    pub description: String,
    pub tags: BTreeSet<String>,
    /// With an explicit version, still bump when the stored prompt differs.
    pub auto_version: bool,
}

impl TrackOptions {
    pub fn new(version: &str) -> Result<Self, VersionError> {
        Ok(Self {
            policy: VersionPolicy::parse(version)?,
            description: String::new(),
            tags: BTreeSet::new(),
            auto_version: true,
        })
    }

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

    pub fn auto_version(mut self, enabled: bool) -> Self {
        self.auto_version = enabled;
        self
    }
}

/// One call to track.
#[derive(Debug, Clone)]
pub struct TrackedCall {
    /// Name of the function the prompt belongs to
    pub owner: String,
    /// Prompt template, possibly with `{name}` placeholders
    pub template: String,
    /// Arguments bound for this call
    pub inputs: BTreeMap<String, Value>,
}

impl TrackedCall {
    pub fn new(owner: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            template: template.into(),
            inputs: BTreeMap::new(),
        }
    }

    pub fn input(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inputs.insert(name.into(), value);
        self
    }
}

/// Substitutes `{name}` placeholders with input values.
///
/// Strings are inserted verbatim and other values as compact JSON. If any
/// placeholder has no matching input, the template is returned unchanged.
pub fn format_prompt(template: &str, inputs: &BTreeMap<String, Value>) -> String {
    let all_bound = PLACEHOLDER
        .captures_iter(template)
        .all(|caps| inputs.contains_key(&caps[1]));
    if !all_bound {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &inputs[&caps[1]] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .into_owned()
}

/// Decides the version a prompt is stored under.
///
/// The owner's current record is its highest semantic version in `store`.
pub fn resolve_version(
    store: &RecordStore,
    owner: &str,
    prompt: &str,
    options: &TrackOptions,
) -> String {
    let current = store.latest_by_semver(owner);

    match (&options.policy, current) {
        (VersionPolicy::Auto, None) => INITIAL_VERSION.to_string(),
        (VersionPolicy::Auto, Some(current)) => next_version(current, prompt),
        (VersionPolicy::Explicit(_), Some(current)) if options.auto_version => {
            if current.prompt() == prompt {
                current.version().to_string()
            } else {
                next_version(current, prompt)
            }
        }
        (VersionPolicy::Explicit(version), _) => version.clone(),
    }
}

fn next_version(current: &VersionRecord, prompt: &str) -> String {
    let analysis = analyze_change(current.prompt(), prompt);
    let next = bump(current.version(), analysis.kind);
    tracing::debug!(
        "{} {} -> {} ({}: {})",
        current.owner(),
        current.version(),
        next,
        analysis.kind,
        analysis.trigger
    );
    next
}

/// Records calls of tracked functions into a store.
pub struct Tracker<'s> {
    store: &'s mut RecordStore,
}

impl<'s> Tracker<'s> {
    pub fn new(store: &'s mut RecordStore) -> Self {
        Self { store }
    }

    /// Runs `f` as a tracked call and returns its result unchanged.
    ///
    /// On failure the record's output is `ERROR: {err}`; the record is still
    /// stored before the error is handed back. Storage problems are logged
    /// and never replace the call's own result. A blank template runs the
    /// call untracked.
    pub fn call<T, E, F>(&mut self, call: TrackedCall, options: &TrackOptions, f: F) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        if call.template.trim().is_empty() {
            tracing::warn!("No prompt found for {}; running untracked", call.owner);
            return f();
        }

        let started = Instant::now();
        let prompt = format_prompt(&call.template, &call.inputs);
        let version = resolve_version(self.store, &call.owner, &prompt, options);

        let outcome = f();
        let elapsed = started.elapsed().as_secs_f64();

        let output = match &outcome {
            Ok(value) => serde_json::to_value(value).unwrap_or_else(|e| {
                tracing::warn!("Could not serialize output of {}: {}", call.owner, e);
                Value::Null
            }),
            Err(e) => Value::String(format!("{ERROR_MARKER}{e}")),
        };
        if let Err(e) = &outcome {
            tracing::warn!("Tracked call {} failed: {}", call.owner, e);
        }

        let record = VersionRecord::builder(prompt, version, call.owner)
            .description(options.description.clone())
            .tags(options.tags.iter().cloned())
            .inputs(call.inputs)
            .output(output)
            .execution_time(elapsed)
            .build();

        match record {
            Ok(record) => {
                let key = record.key();
                if let Err(e) = self.store.add(record) {
                    tracing::warn!("Failed to store {}: {:#}", key, e);
                }
            }
            Err(e) => tracing::warn!("Not storing tracked call: {}", e),
        }

        outcome
    }
}
