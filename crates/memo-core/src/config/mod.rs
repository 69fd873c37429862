//! Startup configuration.
//!
//! An optional JSON file chooses where the database lives and seeds the
//! initial settings. Settings saved in the database win over the file once
//! they exist; the file only fills in values for a fresh install.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Settings, SortBy, SortOrder, ThemeColor};
use crate::util::normalize_text_option;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "MEMO_DB_PATH";

const CONFIG_FILE_NAME: &str = "config.json";

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub default_theme: Option<ThemeColor>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl AppConfig {
    /// Parse a config from a raw JSON payload.
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(payload) => {
                tracing::debug!("Loaded config from {}", path.display());
                Self::parse(&payload)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Read the config from its default location.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Database location: environment, then config file, then the data directory.
    pub fn resolve_database_path(&self) -> PathBuf {
        env::var_os(DB_PATH_ENV)
            .and_then(|value| normalize_text_option(Some(value.to_string_lossy().into_owned())))
            .map(PathBuf::from)
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(default_db_path)
    }

    /// Settings for a database that has none stored yet.
    #[must_use]
    pub fn initial_settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            default_theme: self.default_theme.unwrap_or(defaults.default_theme),
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
        }
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memo")
        .join("memo.db")
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("memo")
        .join(CONFIG_FILE_NAME)
}
