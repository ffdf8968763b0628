//! Credential sources and the providers behind them
//!
//! This module provides four providers, one per backend:
//! 1. Environment variable
//! 2. OS keychain
//! 3. Configuration file (JSON / YAML)
//! 4. Persisted system parameters

mod types;
mod env;
mod config_file;
mod keychain;
mod parameter_store;

pub use types::{CredentialProvider, CredentialSource, SecurityTier};
pub use env::EnvVarProvider;
pub use config_file::ConfigFileProvider;
pub use keychain::KeychainProvider;
pub use parameter_store::{
    FileParameterStore, MemoryParameterStore, ParameterStore, ParameterStoreProvider,
    PARAMETER_FILE_NAME, PARAMETER_KIND,
};
