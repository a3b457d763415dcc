//! Configuration management with layered hierarchy.
//!
//! Later layers override earlier ones, key by key:
//!
//! 1. Built-in defaults
//! 2. Global user config (`~/.config/tally/config.yaml` or the platform
//!    equivalent)
//! 3. Local config: `--config PATH` if given, otherwise `./tally.yaml`
//! 4. `TALLY_DATA_DIR`, `TALLY_PAGE_SIZE`, `TALLY_OUTPUT`, `TALLY_LOG_LEVEL`

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tally_query::DEFAULT_PAGE_SIZE;
use thiserror::Error;

use crate::output::OutputFormat;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "tally.yaml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Tally configuration. Unset keys fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `<entity>.json` exports
    pub data_dir: Option<PathBuf>,

    /// Records per page
    pub page_size: Option<usize>,

    /// Default output format
    pub output: Option<OutputFormat>,

    /// Tracing filter directive, e.g. `debug` or `tally_store=debug`
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order.
    ///
    /// An explicit `--config` file must exist; the global and local files
    /// are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(
            Self::global_config_path().as_deref(),
            explicit,
            |name| std::env::var(name).ok(),
        )
    }

    /// [`load`](Self::load) with the global file and environment supplied
    /// by the caller.
    pub fn load_with<F>(
        global: Option<&Path>,
        explicit: Option<&Path>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(global) = global {
            if let Some(layer) = Self::from_optional_file(global)? {
                config.merge(layer);
            }
        }

        match explicit {
            Some(path) => config.merge(Self::from_file(path)?),
            None => {
                if let Some(layer) = Self::from_optional_file(Path::new(LOCAL_CONFIG))? {
                    config.merge(layer);
                }
            }
        }

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Path to the global config file, if the platform has a config dir.
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tally")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Reads one YAML layer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents, path)
    }

    fn from_optional_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if path.exists() {
            Self::from_file(path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn from_yaml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty file is a valid, empty layer.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TALLY_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = lookup("TALLY_PAGE_SIZE") {
            let parsed = size.trim().parse::<usize>().map_err(|e| ConfigError::Env {
                var: "TALLY_PAGE_SIZE",
                value: size.clone(),
                reason: e.to_string(),
            })?;
            self.page_size = Some(parsed);
        }
        if let Some(output) = lookup("TALLY_OUTPUT") {
            let parsed =
                <OutputFormat as clap::ValueEnum>::from_str(output.trim(), true).map_err(|reason| {
                    ConfigError::Env {
                        var: "TALLY_OUTPUT",
                        value: output.clone(),
                        reason,
                    }
                })?;
            self.output = Some(parsed);
        }
        if let Some(level) = lookup("TALLY_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Page size, never zero.
    pub fn page_size(&self) -> usize {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir(), PathBuf::from("."));
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.output(), OutputFormat::Text);
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_yaml_layer() {
        let config = Config::from_yaml(
            "data_dir: /srv/exports\npage_size: 25\noutput: json\n",
            Path::new("tally.yaml"),
        )
        .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/srv/exports"));
        assert_eq!(config.page_size(), 25);
        assert_eq!(config.output(), OutputFormat::Json);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_empty_yaml_is_empty_layer() {
        let config = Config::from_yaml("\n", Path::new("tally.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_yaml("pagesize: 5\n", Path::new("tally.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config tally.yaml"));
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            data_dir: Some(PathBuf::from("global")),
            page_size: Some(20),
            output: None,
            log_level: Some("info".to_string()),
        };
        base.merge(Config {
            page_size: Some(5),
            output: Some(OutputFormat::Csv),
            ..Config::default()
        });
        assert_eq!(base.data_dir(), PathBuf::from("global"));
        assert_eq!(base.page_size(), 5);
        assert_eq!(base.output(), OutputFormat::Csv);
        assert_eq!(base.log_level(), "info");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            page_size: Some(20),
            ..Config::default()
        };
        config
            .apply_env(env(&[
                ("TALLY_PAGE_SIZE", "50"),
                ("TALLY_OUTPUT", "YAML"),
                ("TALLY_LOG_LEVEL", "debug"),
            ]))
            .unwrap();
        assert_eq!(config.page_size(), 50);
        assert_eq!(config.output(), OutputFormat::Yaml);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let err = Config::default()
            .apply_env(env(&[("TALLY_PAGE_SIZE", "lots")]))
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid value 'lots' for TALLY_PAGE_SIZE"));

        let err = Config::default()
            .apply_env(env(&[("TALLY_OUTPUT", "xml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "TALLY_OUTPUT", .. }));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let config = Config {
            page_size: Some(0),
            ..Config::default()
        };
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }
}
