//! Error types for keytier-core

use thiserror::Error;

/// Result type alias for keytier operations
pub type Result<T> = std::result::Result<T, KeytierError>;

/// Keytier error types
///
/// The resolver itself never returns these; they surface from providers,
/// stores, sinks and settings, and are collapsed to "empty" when a provider
/// fails during resolution.
#[derive(Error, Debug)]
pub enum KeytierError {
    #[error("Invalid credential value: {0}")]
    InvalidValue(String),

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),

    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Keychain error: {0}")]
    KeychainError(String),

    #[error("Audit sink error: {0}")]
    AuditError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
