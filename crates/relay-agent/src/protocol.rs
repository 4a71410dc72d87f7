//! OpenAI chat completions wire format
//!
//! Requests borrow from the internal [`CompletionRequest`]. Stream chunks are
//! parsed leniently here and tightened in [`crate::convert`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{CompletionRequest, Message, ResponseFormat, ToolDefinition};

// -- Request types --

/// Streaming chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAiRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<&'a ResponseFormat>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<OpenAiStreamOptions>,
}

impl<'a> OpenAiRequest<'a> {
    /// Build a streaming request; `include_usage` asks for a final usage chunk
    pub fn streaming(request: &'a CompletionRequest, include_usage: bool) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            tools: request.tools.as_deref().filter(|tools| !tools.is_empty()),
            response_format: request.response_format.as_ref(),
            stream: true,
            stream_options: include_usage.then_some(OpenAiStreamOptions { include_usage: true }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OpenAiStreamOptions {
    pub include_usage: bool,
}

// -- Stream types --

/// Streaming chunk as sent by OpenAI-compatible providers
///
/// Providers disagree on which envelope fields they bother to send, and some
/// send `null` instead of leaving one out, so all of them are optional.
#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    /// Read so it does not land in `extra`; the relayed value is fixed
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<OpenAiStreamChoice>>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
    /// Error event some providers emit inside an otherwise healthy stream
    #[serde(default)]
    pub error: Option<OpenAiErrorBody>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub delta: Option<OpenAiStreamDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAiStreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiStreamToolCall>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiStreamToolCall {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub tool_type: Option<String>,
    #[serde(default)]
    pub function: Option<OpenAiStreamFunctionCall>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiStreamFunctionCall {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiErrorBody {
    #[serde(default)]
    pub message: String,
}
