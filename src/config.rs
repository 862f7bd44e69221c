//! User configuration.
//!
//! Embedded defaults from `config.toml` merged with the user's file at
//! `<config dir>/studio-router/config.toml`, or an explicit path.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::persistence::MigrationDefaults;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const FALLBACK_OUTPUT_DIR: &str = "definitions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    export: ExportConfig,
    #[serde(default)]
    studio: StudioConfig,
}

#[derive(Debug, Deserialize, Default)]
struct ExportConfig {
    output_dir: Option<PathBuf>,
    overwrite: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct StudioConfig {
    show_cv_ports_default: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    export: ExportConfig,
    studio: StudioConfig,
}

impl Default for Config {
    fn default() -> Self {
        let base = embedded_defaults();
        Config {
            export: base.export,
            studio: base.studio,
        }
    }
}

impl Config {
    /// Loads the embedded defaults merged with the user's config file.
    ///
    /// A missing user file is fine. An unreadable or malformed one is
    /// logged and ignored.
    pub fn load() -> Self {
        let mut config = Config::default();
        if let Some(path) = user_config_path() {
            if path.exists() {
                match read_config_file(&path) {
                    Ok(user) => config.merge(user),
                    Err(e) => log::warn!(target: "config", "ignoring {}", e),
                }
            }
        }
        config
    }

    /// Loads the embedded defaults merged with an explicit config file.
    ///
    /// Unlike [`Config::load`], failing to read or parse the file is an error.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.merge(read_config_file(path)?);
        log::debug!(target: "config", "loaded {}", path.display());
        Ok(config)
    }

    fn merge(&mut self, user: ConfigFile) {
        if user.export.output_dir.is_some() {
            self.export.output_dir = user.export.output_dir;
        }
        if user.export.overwrite.is_some() {
            self.export.overwrite = user.export.overwrite;
        }
        if user.studio.show_cv_ports_default.is_some() {
            self.studio.show_cv_ports_default = user.studio.show_cv_ports_default;
        }
    }

    /// Directory definition files are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(FALLBACK_OUTPUT_DIR))
    }

    pub fn overwrite(&self) -> bool {
        self.export.overwrite.unwrap_or(false)
    }

    pub fn show_cv_ports_default(&self) -> bool {
        self.studio.show_cv_ports_default.unwrap_or(false)
    }

    /// Backfill values for older save-files.
    pub fn migration_defaults(&self) -> MigrationDefaults {
        MigrationDefaults {
            show_cv_ports: self.show_cv_ports_default(),
        }
    }
}

fn embedded_defaults() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::error!(target: "config", "embedded config.toml is malformed: {}", e);
        ConfigFile::default()
    })
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studio-router").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let parsed: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed.export.output_dir, Some(PathBuf::from("definitions")));

        let config = Config::default();
        assert_eq!(config.output_dir(), PathBuf::from("definitions"));
        assert!(!config.overwrite());
        assert!(!config.show_cv_ports_default());
    }

    #[test]
    fn test_from_path_merges_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[export]\noverwrite = true\n").unwrap();

        let config = Config::from_path(&path).unwrap();
        assert!(config.overwrite());
        assert_eq!(config.output_dir(), PathBuf::from("definitions"));
        assert!(!config.migration_defaults().show_cv_ports);
    }

    #[test]
    fn test_from_path_studio_section() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[export]\noutput_dir = \"out/defs\"\n\n[studio]\nshow_cv_ports_default = true\n",
        )
        .unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("out/defs"));
        assert!(config.migration_defaults().show_cv_ports);
    }

    #[test]
    fn test_from_path_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = Config::from_path(&tmp.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[export\noverwrite = ").unwrap();
        assert!(matches!(Config::from_path(&path), Err(ConfigError::Parse { .. })));
    }
}
