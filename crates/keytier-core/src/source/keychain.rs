//! OS keychain provider
//!
//! Uses the system keychain:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::debug;

use super::CredentialProvider;
use crate::error::{KeytierError, Result};

/// Reads a credential from an OS keychain entry
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service: String,
    account: String,
}

impl KeychainProvider {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.account)
            .map_err(|e| KeytierError::KeychainError(e.to_string()))
    }

    /// Store a value in the keychain entry
    pub fn store(&self, value: &str) -> Result<()> {
        self.entry()?
            .set_password(value)
            .map_err(|e| KeytierError::KeychainError(e.to_string()))?;

        debug!("Stored keychain entry: {}/{}", self.service, self.account);
        Ok(())
    }

    /// Remove the keychain entry; a missing entry is not an error
    pub fn delete(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeytierError::KeychainError(e.to_string())),
        }
    }
}

impl CredentialProvider for KeychainProvider {
    fn fetch(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => {
                debug!("Keychain entry not found: {}/{}", self.service, self.account);
                Ok(None)
            }
            Err(e) => Err(KeytierError::KeychainError(e.to_string())),
        }
    }

    fn kind(&self) -> &'static str {
        "OS Keychain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_keychain() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    }

    #[test]
    fn test_missing_entry_is_absent() {
        mock_keychain();
        let provider = KeychainProvider::new("keytier-test", "google_api_key");

        assert_eq!(provider.fetch().unwrap(), None);
        assert_eq!(provider.kind(), "OS Keychain");
    }

    #[test]
    fn test_store_and_delete() {
        mock_keychain();
        let provider = KeychainProvider::new("keytier-test", "google_api_key");

        provider.store("AIza-keychain").unwrap();
        provider.delete().unwrap();
        // Deleting an entry that is already gone is not an error
        provider.delete().unwrap();
    }
}
