//! # Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! store_root: /var/lib/odonto/charts
//! services: /etc/odonto/services.yaml
//! log_format: json
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file,
//! and the file over built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Default snapshot directory, relative to the working directory.
pub const DEFAULT_STORE_ROOT: &str = ".odonto/charts";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Snapshot store directory.
    pub store_root: Option<PathBuf>,
    /// Service catalog YAML file.
    pub services: Option<PathBuf>,
    /// Log output format.
    pub log_format: Option<LogFormat>,
}

impl ConfigFile {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Command-line values that override the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--store`.
    pub store_root: Option<PathBuf>,
    /// `--services`.
    pub services: Option<PathBuf>,
    /// `--log-format`.
    pub log_format: Option<LogFormat>,
}

/// Effective settings after merging flags, file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Snapshot store directory.
    pub store_root: PathBuf,
    /// Service catalog YAML file, if any.
    pub services: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Merge overrides over the file over defaults.
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Self {
        Self {
            store_root: overrides
                .store_root
                .or(file.store_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT)),
            services: overrides.services.or(file.services),
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(ConfigFile::default(), Overrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::default();
        assert_eq!(settings.store_root, PathBuf::from(DEFAULT_STORE_ROOT));
        assert_eq!(settings.services, None);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn flags_override_file() {
        let file = ConfigFile {
            store_root: Some("/from/file".into()),
            services: Some("/file/services.yaml".into()),
            log_format: Some(LogFormat::Json),
        };
        let overrides = Overrides {
            store_root: Some("/from/flag".into()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(file, overrides);
        assert_eq!(settings.store_root, PathBuf::from("/from/flag"));
        assert_eq!(settings.services, Some(PathBuf::from("/file/services.yaml")));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odonto.yaml");
        std::fs::write(&path, "store_root: charts\nlog_format: json\n").unwrap();
        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.store_root, Some(PathBuf::from("charts")));
        assert_eq!(file.log_format, Some(LogFormat::Json));
        assert_eq!(file.services, None);
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odonto.yaml");
        std::fs::write(&path, "store: charts\n").unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }
}
