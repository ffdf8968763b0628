//! Tiered credential resolution
//!
//! Sources are tried in order and the first non-empty value wins. A
//! successful resolution emits exactly one audit record naming the winning
//! source; a failed one emits nothing and is not an error.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audit::{AuditContext, AuditRecord, AuditSink};
use crate::secret::SecretValue;
use crate::source::CredentialSource;

/// A successfully resolved credential
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The credential value
    pub value: SecretValue,
    /// Label of the source that produced it
    pub source_label: String,
}

/// Outcome of a resolution: absent when every source was empty
pub type ResolutionResult = Option<Resolved>;

/// Resolve a credential with a default audit context
pub fn resolve(sources: &[CredentialSource], sink: &dyn AuditSink) -> ResolutionResult {
    resolve_with_context(sources, sink, &AuditContext::default())
}

/// Resolve a credential, naming audit records after `context`
pub fn resolve_with_context(
    sources: &[CredentialSource],
    sink: &dyn AuditSink,
    context: &AuditContext,
) -> ResolutionResult {
    for source in sources {
        let Some(value) = source.fetch() else {
            debug!("No {} from {}", context.credential_name, source.label());
            continue;
        };

        let record = AuditRecord::retrieved(source.label(), context);
        if let Err(e) = sink.record(&record) {
            warn!(
                "Failed to write audit record via {} sink: {}",
                sink.sink_name(),
                e
            );
        }

        info!("{} resolved from {}", context.credential_name, source.label());
        return Some(Resolved {
            value,
            source_label: source.label().to_string(),
        });
    }

    debug!(
        "{} not found in any of {} sources",
        context.credential_name,
        sources.len()
    );
    None
}

/// A fixed resolution chain with its audit sink
pub struct TieredResolver {
    sources: Vec<CredentialSource>,
    sink: Arc<dyn AuditSink>,
    context: AuditContext,
}

impl TieredResolver {
    /// Create a resolver over `sources`, highest priority first
    pub fn new(sources: Vec<CredentialSource>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sources,
            sink,
            context: AuditContext::default(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: AuditContext) -> Self {
        self.context = context;
        self
    }

    /// Try the chain in order
    pub fn resolve(&self) -> ResolutionResult {
        resolve_with_context(&self.sources, self.sink.as_ref(), &self.context)
    }

    /// Source labels in priority order
    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(CredentialSource::label).collect()
    }

    pub fn context(&self) -> &AuditContext {
        &self.context
    }

    pub fn sink(&self) -> &Arc<dyn AuditSink> {
        &self.sink
    }
}

impl std::fmt::Debug for TieredResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredResolver")
            .field("sources", &self.labels())
            .field("sink", &self.sink.sink_name())
            .field("context", &self.context)
            .finish()
    }
}
