//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "storage": { "backend": "duckdb" },
//!   "auth": { "requirePassword": false }
//! }
//! ```
//! Fields this crate does not know about are preserved on save.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    storage: StorageSettings,
    #[serde(default)]
    auth: AuthSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default)]
    backend: StorageBackend,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSettings {
    #[serde(default)]
    require_password: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Where the key-value slots are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `skillswap.duckdb` in the data directory
    #[default]
    Duckdb,
    /// One JSON file per slot under `data/`
    Json,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckdb" => Ok(Self::Duckdb),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("unknown storage backend '{}'", other))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duckdb => write!(f, "duckdb"),
            Self::Json => write!(f, "json"),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok().as_deref() {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

/// SkillSwap configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Reject sign-in for users without a stored password
    pub require_password: bool,
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides (for CI/testing):
    /// - SKILLSWAP_STORAGE_BACKEND=duckdb|json
    /// - SKILLSWAP_REQUIRE_PASSWORD=true|false
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = Self::read_settings(data_dir)?;

        let storage_backend = match std::env::var("SKILLSWAP_STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => raw.storage.backend,
        };
        let require_password =
            env_flag("SKILLSWAP_REQUIRE_PASSWORD").unwrap_or(raw.auth.require_password);

        Ok(Self {
            storage_backend,
            require_password,
        })
    }

    fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(&settings_path)?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    /// Save the managed fields, preserving everything else in the file
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = Self::read_settings(data_dir)?;
        settings.storage.backend = self.storage_backend;
        settings.auth.require_password = self.require_password;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Duckdb);
        assert!(!config.require_password);
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme":"dark","auth":{"requirePassword":false,"sessionTtl":30}}"#,
        )
        .unwrap();

        let config = Config {
            storage_backend: StorageBackend::Json,
            require_password: true,
        };
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["auth"]["sessionTtl"], 30);
        assert_eq!(raw["auth"]["requirePassword"], true);
        assert_eq!(raw["storage"]["backend"], "json");
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("JSON".parse::<StorageBackend>().unwrap(), StorageBackend::Json);
        assert_eq!(" duckdb ".parse::<StorageBackend>().unwrap(), StorageBackend::Duckdb);
        assert!(matches!(
            "redis".parse::<StorageBackend>(),
            Err(Error::Config(ref m)) if m.contains("redis")
        ));
        assert_eq!(StorageBackend::Json.to_string(), "json");
    }
}
