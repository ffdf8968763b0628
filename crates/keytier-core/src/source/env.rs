//! Environment variable provider

use std::env::VarError;
use tracing::debug;

use super::CredentialProvider;
use crate::error::{KeytierError, Result};

/// Reads a credential from a process environment variable
#[derive(Debug, Clone)]
pub struct EnvVarProvider {
    name: String,
}

impl EnvVarProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Variable name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CredentialProvider for EnvVarProvider {
    fn fetch(&self) -> Result<Option<String>> {
        match std::env::var(&self.name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => {
                debug!("Environment variable not set: {}", self.name);
                Ok(None)
            }
            Err(VarError::NotUnicode(_)) => Err(KeytierError::InvalidValue(format!(
                "environment variable {} is not valid unicode",
                self.name
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        "Environment Variable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_present() {
        std::env::set_var("KEYTIER_TEST_ENV_PRESENT", "AIza-env");
        let provider = EnvVarProvider::new("KEYTIER_TEST_ENV_PRESENT");
        assert_eq!(provider.fetch().unwrap(), Some("AIza-env".to_string()));
        std::env::remove_var("KEYTIER_TEST_ENV_PRESENT");
    }

    #[test]
    fn test_env_var_missing() {
        let provider = EnvVarProvider::new("KEYTIER_TEST_ENV_DEFINITELY_UNSET");
        assert_eq!(provider.fetch().unwrap(), None);
    }
}
