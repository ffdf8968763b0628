//! Resolved secret values with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of leading characters shown by [`SecretValue::masked`]
const MASK_PREFIX_LEN: usize = 4;

/// Secrets shorter than this are fully masked
const MASK_MIN_LEN: usize = 12;

/// Resolved credential value - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    value: String,
}

impl SecretValue {
    /// Create a new secret value
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }

    /// Display form safe for logs and terminals (e.g. "AIza...")
    pub fn masked(&self) -> String {
        if self.value.chars().count() < MASK_MIN_LEN {
            return "****".to_string();
        }
        let prefix: String = self.value.chars().take(MASK_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

impl Clone for SecretValue {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValue")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose_and_into_inner() {
        let secret = SecretValue::new("AIzaSyExample".to_string());
        assert_eq!(secret.expose(), "AIzaSyExample");
        assert_eq!(secret.into_inner(), "AIzaSyExample");
    }

    #[test]
    fn test_masked() {
        let long = SecretValue::new("AIzaSyD-1234567890".to_string());
        assert_eq!(long.masked(), "AIza...");

        let short = SecretValue::new("ABC123".to_string());
        assert_eq!(short.masked(), "****");
    }

    #[test]
    fn test_debug_redacted() {
        let secret = SecretValue::new("super-secret-key".to_string());
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret-key"));
    }
}
