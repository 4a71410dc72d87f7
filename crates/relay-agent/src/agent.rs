//! The chat agent: one configured conversation turn against one provider

use std::sync::Arc;

use crate::error::AgentError;
use crate::provider::{ChunkStream, Provider};
use crate::types::{CompletionRequest, Message, ResponseFormat, Role, ToolDefinition};

/// Everything that selects and shapes a completion
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Provider name, e.g. `moonshot`
    pub provider: String,
    /// Model name as the provider knows it, e.g. `kimi-k2.5`
    pub model: String,
    /// Prepended when the history has no system message
    pub system_prompt: String,
    pub tools: Option<Vec<ToolDefinition>>,
    pub response_format: Option<ResponseFormat>,
}

impl AgentConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            tools: None,
            response_format: None,
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    #[must_use]
    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = Some(response_format);
        self
    }

    /// `<provider>/<model>`, as used in logs
    pub fn address(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// A configured agent bound to its provider
///
/// Holds no conversation state; every call to [`Agent::run_streaming`]
/// dispatches a fresh request.
pub struct Agent {
    config: AgentConfig,
    provider: Arc<dyn Provider>,
}

impl Agent {
    pub fn new(config: AgentConfig, provider: Arc<dyn Provider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Stream a completion for `history`
    ///
    /// The system prompt is prepended when the history has none. Every
    /// provider chunk is yielded, in order.
    ///
    /// # Errors
    ///
    /// Returns the provider's failure if the stream cannot be opened.
    pub async fn run_streaming(&self, history: &[Message]) -> Result<ChunkStream, AgentError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: prepare_history(&self.config.system_prompt, history),
            tools: self.config.tools.clone(),
            response_format: self.config.response_format.clone(),
        };

        tracing::debug!(
            address = %self.config.address(),
            messages = request.messages.len(),
            "dispatching streaming completion"
        );

        self.provider.stream(&request).await
    }
}

/// History as sent to the provider
///
/// A system message carrying `system_prompt` is prepended when `history`
/// has none; otherwise the history is returned unchanged.
pub fn prepare_history(system_prompt: &str, history: &[Message]) -> Vec<Message> {
    if history.iter().any(|message| message.role == Role::System) {
        return history.to_vec();
    }

    let mut prepared = Vec::with_capacity(history.len() + 1);
    prepared.push(Message::system(system_prompt));
    prepared.extend_from_slice(history);
    prepared
}
