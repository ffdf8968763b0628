//! API key retrieval over the standard security tiers
//!
//! Tier order, highest trust first:
//! 1. environment variable
//! 2. OS keychain (when enabled)
//! 3. configuration file (when configured)
//! 4. system parameters

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::audit::{AuditContext, AuditSink, JsonlAuditSink, MultiAuditSink, TracingAuditSink};
use crate::resolver::{ResolutionResult, TieredResolver};
use crate::settings::Settings;
use crate::source::{
    ConfigFileProvider, CredentialSource, EnvVarProvider, FileParameterStore,
    KeychainProvider, ParameterStore, ParameterStoreProvider, SecurityTier, PARAMETER_KIND,
};

/// Build the standard chain described by `settings`
///
/// Without a parameter store the low tier stays in the chain and always
/// comes back empty.
pub fn standard_sources(
    settings: &Settings,
    parameters: Option<Arc<dyn ParameterStore>>,
) -> Vec<CredentialSource> {
    let mut sources = vec![CredentialSource::tiered(
        SecurityTier::High,
        EnvVarProvider::new(&settings.env_var),
    )];

    if settings.keychain.enabled {
        sources.push(CredentialSource::tiered(
            SecurityTier::High,
            KeychainProvider::new(&settings.keychain.service, &settings.keychain.account),
        ));
    }

    if let Some(path) = &settings.config_file {
        sources.push(CredentialSource::tiered(
            SecurityTier::Medium,
            ConfigFileProvider::new(path, &settings.config_key),
        ));
    }

    match parameters {
        Some(store) => {
            sources.push(CredentialSource::tiered(
                SecurityTier::Low,
                ParameterStoreProvider::new(store, &settings.parameter_key),
            ));
        }
        None => sources.push(CredentialSource::new(
            SecurityTier::Low.label_for(PARAMETER_KIND),
            || None,
        )),
    }

    sources
}

/// Audit sink described by `settings`: tracing, plus a JSON lines file if set
pub fn audit_sink_for(settings: &Settings) -> Arc<dyn AuditSink> {
    match &settings.audit.log_file {
        Some(path) => Arc::new(
            MultiAuditSink::new()
                .with(Arc::new(TracingAuditSink))
                .with(Arc::new(JsonlAuditSink::new(path))),
        ),
        None => Arc::new(TracingAuditSink),
    }
}

/// Retrieves an API key through the configured security tiers
#[derive(Debug)]
pub struct ApiKeyManager {
    resolver: TieredResolver,
}

impl ApiKeyManager {
    /// Build the manager from settings, opening the file parameter store
    /// under `data_dir` unless settings name another file
    pub fn from_settings(settings: &Settings, data_dir: &Path) -> Self {
        let parameter_path = settings.parameter_file_in(data_dir);

        let parameters: Option<Arc<dyn ParameterStore>> =
            match FileParameterStore::open(&parameter_path) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    warn!(
                        "Parameter store {:?} unavailable, skipping tier: {}",
                        parameter_path, e
                    );
                    None
                }
            };

        Self::with_parts(settings, parameters, audit_sink_for(settings))
    }

    /// Build the manager from explicit collaborators
    pub fn with_parts(
        settings: &Settings,
        parameters: Option<Arc<dyn ParameterStore>>,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let mut context = AuditContext::new(&settings.credential_name);
        context.database = settings.audit.database.clone();

        let resolver = TieredResolver::new(standard_sources(settings, parameters), sink)
            .with_context(context);

        debug!("API key chain: {:?}", resolver.labels());
        Self { resolver }
    }

    /// Retrieve the API key from the most secure tier that has one
    pub fn get_api_key(&self) -> ResolutionResult {
        self.resolver.resolve()
    }

    /// Tier labels in priority order
    pub fn labels(&self) -> Vec<&str> {
        self.resolver.labels()
    }

    pub fn resolver(&self) -> &TieredResolver {
        &self.resolver
    }
}
