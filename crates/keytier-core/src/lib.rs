//! # keytier-core
//!
//! Tiered credential resolution:
//! - Ordered credential sources, highest trust first
//! - Environment, OS keychain, config file and parameter store providers
//! - One durable audit record per successful resolution
//! - Secret values with zeroize-on-drop security

pub mod api_key;
pub mod audit;
pub mod error;
pub mod resolver;
pub mod secret;
pub mod settings;
pub mod source;

pub use api_key::ApiKeyManager;
pub use audit::{
    AuditContext, AuditRecord, AuditSink, JsonlAuditSink, MemoryAuditSink, MultiAuditSink,
    Severity, TracingAuditSink,
};
pub use error::{KeytierError, Result};
pub use resolver::{resolve, resolve_with_context, ResolutionResult, Resolved, TieredResolver};
pub use secret::SecretValue;
pub use settings::{default_data_dir, Settings, SettingsManager};
pub use source::{
    ConfigFileProvider, CredentialProvider, CredentialSource, EnvVarProvider, FileParameterStore,
    KeychainProvider, MemoryParameterStore, ParameterStore, ParameterStoreProvider, SecurityTier,
};
