//! Provider registry shared by all requests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use relay_config::{ProviderConfig, ProviderSettings, resolve_providers};
use relay_telemetry::StreamMetrics;
use reqwest::Client;

use crate::agent::{Agent, AgentConfig};
use crate::error::AgentError;
use crate::provider::Provider;
use crate::provider::openai::OpenAiCompatProvider;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for chat handlers
///
/// Immutable after construction; cloning is cheap.
#[derive(Clone)]
pub struct AgentState {
    pub(crate) inner: Arc<AgentStateInner>,
}

pub(crate) struct AgentStateInner {
    pub(crate) providers: HashMap<String, Arc<dyn Provider>>,
    pub(crate) metrics: StreamMetrics,
}

impl AgentState {
    /// Build the registry from a set of providers, keyed by their names
    pub fn new(providers: impl IntoIterator<Item = Arc<dyn Provider>>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.name().to_owned(), provider))
            .collect();

        Self {
            inner: Arc::new(AgentStateInner {
                providers,
                metrics: StreamMetrics::new(),
            }),
        }
    }

    /// Build from configuration, merging the built-in provider catalog
    ///
    /// API keys named by environment variables are read here, once.
    pub fn from_config(configured: &IndexMap<String, ProviderConfig>) -> Result<Self, AgentError> {
        let settings = resolve_providers(configured, |var| std::env::var(var).ok())?;
        Self::from_settings(settings)
    }

    /// Build from already resolved provider settings
    pub fn from_settings(settings: Vec<ProviderSettings>) -> Result<Self, AgentError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;

        let providers = settings.into_iter().map(|settings| {
            tracing::debug!(
                provider = %settings.name,
                base_url = %settings.base_url,
                authenticated = settings.api_key.is_some(),
                "registered provider"
            );
            Arc::new(OpenAiCompatProvider::new(client.clone(), settings)) as Arc<dyn Provider>
        });

        Ok(Self::new(providers))
    }

    /// Build an agent for `config`
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotFound` if no provider has the requested name.
    pub fn agent(&self, config: AgentConfig) -> Result<Agent, AgentError> {
        let provider = self
            .inner
            .providers
            .get(&config.provider)
            .cloned()
            .ok_or_else(|| AgentError::ProviderNotFound {
                provider: config.provider.clone(),
            })?;

        Ok(Agent::new(config, provider))
    }

    /// Registered provider names, sorted
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.inner.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn metrics(&self) -> &StreamMetrics {
        &self.inner.metrics
    }
}
