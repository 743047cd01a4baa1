//! Configuration management
//!
//! Settings are resolved from built-in defaults, then the YAML file at
//! `~/.chorus/config.yaml`, then the `CHORUS_STORAGE_PATH` and
//! `CHORUS_SCOPE` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default directory holding snapshots, relative to the working directory.
pub const DEFAULT_STORAGE_PATH: &str = ".prompts";

/// Default label used in snapshot file names.
pub const DEFAULT_SCOPE: &str = "run";

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["storage_path", "scope"];

const STORAGE_PATH_ENV: &str = "CHORUS_STORAGE_PATH";
const SCOPE_ENV: &str = "CHORUS_SCOPE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding snapshot files
    pub storage_path: PathBuf,

    /// Label embedded in snapshot file names
    pub scope: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from the default file and the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Loads a config file, using defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Overrides settings from environment variables looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var(STORAGE_PATH_ENV).filter(|v| !v.is_empty()) {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(scope) = var(SCOPE_ENV).filter(|v| !v.is_empty()) {
            self.scope = scope;
        }
    }

    /// Writes the configuration as YAML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_saphyr::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml).with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".chorus");

        Ok(config_dir.join("config.yaml"))
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "storage_path" => Ok(self.storage_path.display().to_string()),
            "scope" => Ok(self.scope.clone()),
            _ => bail!("Unknown config key '{key}'. Valid keys: {}", CONFIG_KEYS.join(", ")),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            bail!("Config value for '{key}' cannot be empty");
        }
        match key {
            "storage_path" => self.storage_path = PathBuf::from(value),
            "scope" => self.scope = value.to_string(),
            _ => bail!("Unknown config key '{key}'. Valid keys: {}", CONFIG_KEYS.join(", ")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_path, PathBuf::from(".prompts"));
        assert_eq!(config.scope, "run");
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            storage_path: PathBuf::from("/tmp/prompts"),
            scope: "agent".to_string(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "scope: worker\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scope, "worker");
        assert_eq!(config.storage_path, PathBuf::from(".prompts"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "scope: [unclosed\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "CHORUS_STORAGE_PATH" => Some("/data/prompts".to_string()),
            "CHORUS_SCOPE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.storage_path, PathBuf::from("/data/prompts"));
        assert_eq!(config.scope, "run");
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        config.set("scope", "batch").unwrap();
        assert_eq!(config.get("scope").unwrap(), "batch");
        assert!(config.set("color", "blue").is_err());
        assert!(config.get("color").is_err());
        assert!(config.set("scope", " ").is_err());
    }
}
