//! Configuration file provider
//!
//! Reads a JSON or YAML configuration file on every fetch and looks the key
//! up at the top level, then under an `options` table (the layout server
//! config files commonly use).

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::CredentialProvider;
use crate::error::{KeytierError, Result};

/// Table consulted when the key is missing at the top level
const OPTIONS_SECTION: &str = "options";

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            other => Err(KeytierError::UnsupportedFormat(format!(
                "{} (extension {:?})",
                path.display(),
                other.unwrap_or("")
            ))),
        }
    }
}

/// Reads a credential from a key in a configuration file
#[derive(Debug, Clone)]
pub struct ConfigFileProvider {
    path: PathBuf,
    key: String,
}

impl ConfigFileProvider {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Value> {
        let format = Format::from_path(&self.path)?;
        let contents = std::fs::read_to_string(&self.path)?;

        let value = match format {
            Format::Json => serde_json::from_str(&contents)?,
            Format::Yaml => serde_yaml::from_str(&contents)?,
        };

        Ok(value)
    }

    fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        root.get(&self.key)
            .or_else(|| root.get(OPTIONS_SECTION).and_then(|opts| opts.get(&self.key)))
    }
}

impl CredentialProvider for ConfigFileProvider {
    fn fetch(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("Config file not found: {:?}", self.path);
            return Ok(None);
        }

        let root = self.load()?;

        match self.lookup(&root) {
            None | Some(Value::Null) => {
                debug!("Key '{}' not present in {:?}", self.key, self.path);
                Ok(None)
            }
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(KeytierError::ConfigError(format!(
                "key '{}' in {} is not a scalar value",
                self.key,
                self.path.display()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        "Config File"
    }
}
