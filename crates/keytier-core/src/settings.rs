//! Resolver settings management
//!
//! Stores the names, keys and paths of every tier in a plain JSON file.
//! Settings never hold credential values themselves.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{KeytierError, Result};
use crate::source::PARAMETER_FILE_NAME;

/// Settings file name inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// OS keychain tier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeychainSettings {
    /// Whether the keychain tier is part of the chain
    pub enabled: bool,
    /// Keychain service name
    pub service: String,
    /// Keychain account name
    pub account: String,
}

impl Default for KeychainSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            service: "keytier".to_string(),
            account: "google_api_key".to_string(),
        }
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditSettings {
    /// JSON lines file receiving durable audit records
    pub log_file: Option<PathBuf>,
    /// Database or deployment name stamped on records
    pub database: Option<String>,
}

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Credential name used in audit records
    pub credential_name: String,
    /// Environment variable holding the credential
    pub env_var: String,
    /// Configuration file (JSON or YAML); the tier is skipped when unset
    pub config_file: Option<PathBuf>,
    /// Key looked up in the configuration file
    pub config_key: String,
    /// Parameter store file (defaults to `parameters.json` in the data dir)
    pub parameter_file: Option<PathBuf>,
    /// Key looked up in the parameter store
    pub parameter_key: String,
    pub keychain: KeychainSettings,
    pub audit: AuditSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            credential_name: "Google API Key".to_string(),
            env_var: "GOOGLE_API_KEY".to_string(),
            config_file: None,
            config_key: "google_api_key".to_string(),
            parameter_file: None,
            parameter_key: "google_api_key".to_string(),
            keychain: KeychainSettings::default(),
            audit: AuditSettings::default(),
        }
    }
}

impl Settings {
    /// Parameter store path, falling back to the data directory
    pub fn parameter_file_in(&self, data_dir: &Path) -> PathBuf {
        self.parameter_file
            .clone()
            .unwrap_or_else(|| data_dir.join(PARAMETER_FILE_NAME))
    }
}

/// Platform data directory for keytier
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "keytier", "keytier")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| KeytierError::StorageError("Could not determine data directory".to_string()))
}

/// Settings manager
pub struct SettingsManager {
    data_dir: PathBuf,
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a settings manager for a data directory
    pub fn new(data_dir: &Path) -> Self {
        let settings_file = data_dir.join(SETTINGS_FILE_NAME);
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings file {:?}: {}", settings_file, e);
            Settings::default()
        });

        Self {
            data_dir: data_dir.to_path_buf(),
            settings_file,
            settings,
        }
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        tokio::fs::create_dir_all(&self.data_dir).await?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }

    /// Data directory the settings live in
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the settings file
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Whether a settings file exists on disk
    pub fn exists(&self) -> bool {
        self.settings_file.exists()
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| KeytierError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}
