//! OpenAI-compatible provider implementation

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use http::header::CONTENT_TYPE;
use relay_config::ProviderSettings;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::{ChunkStream, Provider};
use crate::error::AgentError;
use crate::protocol::{OpenAiRequest, OpenAiStreamChunk};
use crate::types::{CompletionRequest, StreamChunk};

const DONE: &str = "[DONE]";

/// Longest upstream error text passed on to clients
const MAX_ERROR_MESSAGE: usize = 512;

/// Whether the provider is the canonical OpenAI API (vs a compatible third-party)
fn is_canonical_openai(base_url: &Url) -> bool {
    base_url.host_str().is_some_and(|h| h == "api.openai.com")
}

/// Provider for any API speaking OpenAI chat completions
pub struct OpenAiCompatProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl OpenAiCompatProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self {
            name: settings.name,
            client,
            base_url: settings.base_url,
            api_key: settings.api_key,
        }
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<ChunkStream, AgentError> {
        // Only canonical OpenAI gets stream_options; several compatible
        // APIs reject the unknown parameter
        let wire_request = OpenAiRequest::streaming(request, is_canonical_openai(&self.base_url));

        let mut builder = self.client.post(self.completions_url()).json(&wire_request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = %self.name, error = %e, "upstream stream request failed");
            AgentError::from(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.name, status = %status, body = %body, "upstream returned error");
            return Err(AgentError::Provider {
                status: Some(status.as_u16()),
                message: upstream_error_message(&body),
            });
        }

        ensure_event_stream(&response)?;

        let provider = self.name.clone();
        let mut events = response.bytes_stream().eventsource();

        let chunks = async_stream::stream! {
            while let Some(result) = events.next().await {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(provider = %provider, error = %e, "upstream stream broke");
                        yield Err(AgentError::Network(e.to_string()));
                        break;
                    }
                };

                let data = event.data.trim();
                if data == DONE {
                    break;
                }
                if data.is_empty() {
                    continue;
                }

                match decode_chunk(data) {
                    Ok(chunk) => yield Ok(chunk),
                    Err(e) => {
                        tracing::warn!(provider = %provider, error = %e, "upstream stream failed");
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(chunks))
    }
}

/// Decode one SSE `data` payload into a chunk
///
/// An in-stream `{"error": ...}` event becomes [`AgentError::Provider`] and
/// a payload that is not a chunk becomes [`AgentError::UnexpectedShape`].
fn decode_chunk(data: &str) -> Result<StreamChunk, AgentError> {
    match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(OpenAiStreamChunk { error: Some(failure), .. }) => Err(AgentError::Provider {
            status: None,
            message: failure.message,
        }),
        Ok(chunk) => Ok(StreamChunk::from(chunk)),
        Err(e) => Err(AgentError::UnexpectedShape(format!("unparseable stream chunk: {e}"))),
    }
}

/// Client-facing text for an upstream error body
///
/// Prefers the OpenAI-style `error.message`; anything else is cut to
/// [`MAX_ERROR_MESSAGE`] characters.
fn upstream_error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.pointer("/error/message").and_then(Value::as_str).map(str::to_owned));

    let text = message.unwrap_or_else(|| body.trim().to_owned());
    if text.chars().count() <= MAX_ERROR_MESSAGE {
        return text;
    }

    let mut truncated: String = text.chars().take(MAX_ERROR_MESSAGE).collect();
    truncated.push_str("...");
    truncated
}

/// Reject responses that are not an event stream
fn ensure_event_stream(response: &Response) -> Result<(), AgentError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("text/event-stream") {
        Ok(())
    } else {
        Err(AgentError::UnexpectedShape(format!(
            "expected an event stream, provider sent '{content_type}'"
        )))
    }
}
