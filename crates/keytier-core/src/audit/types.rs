//! Audit record type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record kind written by the resolver
const SERVER_KIND: &str = "server";

/// Severity of an audit record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

/// Naming context for audit records produced by a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    /// Credential being resolved (e.g. "Google API Key")
    pub credential_name: String,
    /// Database or deployment the resolution ran for
    pub database: Option<String>,
}

impl AuditContext {
    pub fn new(credential_name: impl Into<String>) -> Self {
        Self {
            credential_name: credential_name.into(),
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

impl Default for AuditContext {
    fn default() -> Self {
        Self::new("Credential")
    }
}

/// Append-only entry documenting which source resolved a credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: Uuid,
    /// Short title, e.g. "Google API Key Retrieved"
    pub name: String,
    pub kind: String,
    pub severity: Severity,
    pub source_label: String,
    pub database: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Record for a successful resolution through `source_label`
    pub fn retrieved(source_label: &str, context: &AuditContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("{} Retrieved", context.credential_name),
            kind: SERVER_KIND.to_string(),
            severity: Severity::Info,
            source_label: source_label.to_string(),
            database: context.database.clone(),
            message: format!(
                "{} retrieved using {}.",
                context.credential_name, source_label
            ),
            timestamp: Utc::now(),
        }
    }
}
