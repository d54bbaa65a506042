//! Configuration management
//!
//! Settings live in `settings.json` inside the app directory:
//! ```json
//! {
//!   "app": { "storage": "file", "loginPage": "ui/login.html" }
//! }
//! ```
//! Fields this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ports::DEFAULT_LOGIN_PAGE;

/// Settings file name inside the app directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Which storage adapter backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `storage.json` in the app directory
    #[default]
    File,
    /// `localauth.duckdb` in the app directory
    Duckdb,
    /// Nothing persisted
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::File => "file",
            StorageBackend::Duckdb => "duckdb",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" | "json" => Ok(StorageBackend::File),
            "duckdb" => Ok(StorageBackend::Duckdb),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend '{}' (expected file, duckdb or memory)", other),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    storage: StorageBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    login_page: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// localauth configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub login_page: String,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

/// Parse settings.json, falling back to defaults when it is missing or malformed
fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "ignoring malformed settings file, using defaults"
            );
            Ok(SettingsFile::default())
        }
    }
}

impl Config {
    /// Load config from the app directory, then apply environment overrides
    ///
    /// Environment overrides (for CI/testing):
    /// - `LOCALAUTH_STORAGE`: file | duckdb | memory
    /// - `LOCALAUTH_LOGIN_PAGE`: redirect target for `require_auth`
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_file(app_dir)?.with_env_overrides()
    }

    /// Load only what settings.json says
    pub fn load_file(app_dir: &Path) -> Result<Self> {
        let raw = read_settings(&app_dir.join(SETTINGS_FILE))?;
        Ok(Self {
            storage: raw.app.storage,
            login_page: raw
                .app
                .login_page
                .clone()
                .unwrap_or_else(|| DEFAULT_LOGIN_PAGE.to_string()),
            _raw_settings: raw,
        })
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(value) = non_empty_env("LOCALAUTH_STORAGE") {
            self.storage = value
                .parse::<StorageBackend>()
                .with_context(|| format!("Invalid LOCALAUTH_STORAGE value '{}'", value))?;
        }
        if let Some(page) = non_empty_env("LOCALAUTH_LOGIN_PAGE") {
            self.login_page = page;
        }
        Ok(self)
    }

    /// Save config to the app directory
    ///
    /// Re-reads the file first so settings written by other tools survive.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            read_settings(&settings_path)?
        } else {
            self._raw_settings.clone()
        };

        settings.app.storage = self.storage;
        settings.app.login_page = if self.login_page == DEFAULT_LOGIN_PAGE {
            None
        } else {
            Some(self.login_page.clone())
        };

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
