use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const CONFIG_DIR_NAME: &str = "mpdraft";
const CONFIG_FILE_NAME: &str = "config.json";

/// Result returned by [`ConfigStore::load`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No persisted configuration was found or usable; defaults were synthesized.
    Default,
    /// Configuration was read from `config.json`.
    File,
}

/// Errors that can occur when persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Ser(#[from] serde_json::Error),
}

/// Disk-backed configuration record.
///
/// Older files written before simulate mode existed lack the `simulate` key;
/// those load with simulate mode switched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub appsecret: String,
    #[serde(default = "FileConfig::default_simulate")]
    pub simulate: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            appid: String::new(),
            appsecret: String::new(),
            simulate: Self::default_simulate(),
        }
    }
}

impl FileConfig {
    const fn default_simulate() -> bool {
        true
    }

    pub fn new(appid: &str, appsecret: &str, simulate: bool) -> Self {
        Self {
            appid: appid.trim().to_string(),
            appsecret: appsecret.trim().to_string(),
            simulate,
        }
    }

    /// Both credentials are non-empty.
    pub fn has_credentials(&self) -> bool {
        !self.appid.is_empty() && !self.appsecret.is_empty()
    }
}

/// Directory where mpdraft stores its configuration.
pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path to `config.json`.
pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Flat JSON settings file. No locking: concurrent saves race and the last write wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(config_path())
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, falling back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> ConfigLoadResult {
        let mut warnings = Vec::new();

        if !self.path.exists() {
            debug!(path = %self.path.display(), "No configuration file; using defaults");
            return ConfigLoadResult {
                config: FileConfig::default(),
                warnings,
                source: ConfigSource::Default,
            };
        }

        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<FileConfig>(&raw) {
                Ok(config) => {
                    return ConfigLoadResult {
                        config,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {} as JSON: {}. Falling back to defaults.",
                        self.path.display(),
                        err
                    ));
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "Failed to read {}: {}. Falling back to defaults.",
                    self.path.display(),
                    err
                ));
            }
        }

        for warning in &warnings {
            warn!("{warning}");
        }

        ConfigLoadResult {
            config: FileConfig::default(),
            warnings,
            source: ConfigSource::Default,
        }
    }

    /// Overwrite the file with exactly `appid`, `appsecret` and `simulate`.
    pub fn save(
        &self,
        appid: &str,
        appsecret: &str,
        simulate: bool,
    ) -> Result<FileConfig, ConfigError> {
        let config = FileConfig::new(appid, appsecret, simulate);
        self.write(&config)?;
        Ok(config)
    }

    pub fn write(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, serialized)?;
        debug!(path = %self.path.display(), simulate = config.simulate, "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_simulating_defaults() {
        let temp = tempdir().expect("tempdir");
        let store = ConfigStore::new(temp.path().join("config.json"));

        let loaded = store.load();

        assert_eq!(loaded.source, ConfigSource::Default);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config, FileConfig::default());
        assert!(loaded.config.simulate);
    }

    #[test]
    fn corrupt_file_falls_back_with_warning() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").expect("write fixture");

        let loaded = ConfigStore::new(&path).load();

        assert_eq!(loaded.source, ConfigSource::Default);
        assert_eq!(loaded.config, FileConfig::default());
        assert!(
            loaded.warnings.iter().any(|w| w.contains("Falling back")),
            "expected a fallback warning, got {:?}",
            loaded.warnings
        );
    }

    #[test]
    fn legacy_file_without_simulate_defaults_to_true() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"appid":"wx123","appsecret":"s3cret"}"#).expect("write fixture");

        let loaded = ConfigStore::new(&path).load();

        assert_eq!(loaded.source, ConfigSource::File);
        assert_eq!(loaded.config.appid, "wx123");
        assert_eq!(loaded.config.appsecret, "s3cret");
        assert!(loaded.config.simulate);
    }

    #[test]
    fn save_trims_and_writes_exactly_three_fields() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.json");
        let store = ConfigStore::new(&path);

        let saved = store
            .save("  wx123 ", "\tsecret\n", false)
            .expect("save config");
        assert_eq!(saved.appid, "wx123");
        assert_eq!(saved.appsecret, "secret");

        let raw = fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        let object = value.as_object().expect("json object");
        assert_eq!(object.len(), 3);
        assert_eq!(object["appid"], "wx123");
        assert_eq!(object["appsecret"], "secret");
        assert_eq!(object["simulate"], false);

        let reloaded = store.load();
        assert_eq!(reloaded.source, ConfigSource::File);
        assert_eq!(reloaded.config, saved);
    }

    #[test]
    fn last_write_wins() {
        let temp = tempdir().expect("tempdir");
        let store = ConfigStore::new(temp.path().join("config.json"));

        store.save("first", "one", true).expect("first save");
        store.save("second", "two", false).expect("second save");

        let loaded = store.load().config;
        assert_eq!(loaded.appid, "second");
        assert!(!loaded.simulate);
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(!FileConfig::default().has_credentials());
        assert!(!FileConfig::new("wx", " ", false).has_credentials());
        assert!(FileConfig::new("wx", "secret", false).has_credentials());
    }
}
