use std::collections::BTreeMap;

use super::message::Message;
use super::tool::ToolDefinition;

/// Response format hint, e.g. `{"type": "json_object"}`
pub type ResponseFormat = BTreeMap<String, String>;

/// A streaming completion request as handed to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name as the provider knows it
    pub model: String,
    /// Full history, system prompt included
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub response_format: Option<ResponseFormat>,
}
