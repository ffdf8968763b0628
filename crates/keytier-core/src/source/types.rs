//! Credential source type definitions

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::secret::SecretValue;

/// Security tier of a credential source, highest trust first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityTier {
    /// Process environment, OS keychain
    High,
    /// Operator-managed configuration files
    Medium,
    /// Persisted parameters editable from inside the application
    Low,
}

impl SecurityTier {
    /// Human-readable tier name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Label for a source of the given kind in this tier,
    /// e.g. "Medium Security (Config File)"
    pub fn label_for(&self, kind: &str) -> String {
        format!("{} Security ({})", self.as_str(), kind)
    }
}

impl std::fmt::Display for SecurityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend that may hold a credential value
pub trait CredentialProvider: Send + Sync {
    /// Look up the credential
    ///
    /// # Returns
    /// * `Ok(Some(value))` - the backend holds a value
    /// * `Ok(None)` - the backend has nothing for this credential
    /// * `Err(error)` - the backend could not be read
    fn fetch(&self) -> Result<Option<String>>;

    /// Short description of the backend kind (e.g. "Environment Variable")
    fn kind(&self) -> &'static str;
}

type FetchFn = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// A labelled credential lookup, one entry of a resolution chain
pub struct CredentialSource {
    label: String,
    fetch: FetchFn,
}

impl CredentialSource {
    /// Create a source from an infallible lookup
    pub fn new<F>(label: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            fetch: Box::new(fetch),
        }
    }

    /// Create a source from a fallible lookup; errors count as an empty result
    pub fn fallible<F>(label: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> Result<Option<String>> + Send + Sync + 'static,
    {
        let label = label.into();
        let source_label = label.clone();

        Self::new(label, move || match fetch() {
            Ok(value) => value,
            Err(e) => {
                warn!("Credential source '{}' unavailable: {}", source_label, e);
                None
            }
        })
    }

    /// Wrap a provider, labelling it by tier and provider kind
    pub fn tiered<P>(tier: SecurityTier, provider: P) -> Self
    where
        P: CredentialProvider + 'static,
    {
        let label = tier.label_for(provider.kind());
        Self::fallible(label, move || provider.fetch())
    }

    /// Source label used in audit records
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Query the source
    ///
    /// Returns `None` when the lookup is absent, failed, or yielded an
    /// empty string.
    pub fn fetch(&self) -> Option<SecretValue> {
        (self.fetch)()
            .filter(|value| !value.is_empty())
            .map(SecretValue::new)
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
