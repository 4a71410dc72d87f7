//! Axum route handler for `POST /chat/stream`

use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use relay_core::{HttpError, error_body};
use relay_telemetry::{StreamMetrics, StreamOutcome};
use serde::Deserialize;

use crate::agent::AgentConfig;
use crate::error::AgentError;
use crate::provider::ChunkStream;
use crate::state::AgentState;
use crate::types::{Message, ResponseFormat, ToolDefinition};

/// Build the chat router
pub fn chat_router(state: AgentState) -> Router {
    Router::new()
        .route("/chat/stream", routing::post(chat_stream))
        .with_state(state)
}

/// Body of `POST /chat/stream`
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    pub provider: String,
    pub system_prompt: String,
    pub model: String,
    pub history: Vec<Message>,
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
}

impl AgentRequest {
    fn validate(&self) -> Result<(), AgentError> {
        if self.provider.trim().is_empty() {
            return Err(AgentError::Validation("`provider` must not be blank".to_owned()));
        }
        if self.model.trim().is_empty() {
            return Err(AgentError::Validation("`model` must not be blank".to_owned()));
        }
        Ok(())
    }

    fn into_parts(self) -> (AgentConfig, Vec<Message>) {
        let config = AgentConfig {
            provider: self.provider,
            model: self.model,
            system_prompt: self.system_prompt,
            tools: self.tools,
            response_format: self.response_format,
        };
        (config, self.history)
    }
}

/// Handle `POST /chat/stream`
async fn chat_stream(State(state): State<AgentState>, payload: Result<Json<AgentRequest>, JsonRejection>) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(&rejection),
    };

    if let Err(e) = request.validate() {
        return error_response(&e);
    }

    let (config, history) = request.into_parts();

    let agent = match state.agent(config) {
        Ok(agent) => agent,
        Err(e) => {
            tracing::warn!(error = %e, "chat stream rejected");
            return error_response(&e);
        }
    };

    let provider = agent.config().provider.clone();
    let address = agent.config().address();
    tracing::info!(address = %address, messages = history.len(), "chat stream requested");

    let started = Instant::now();
    match agent.run_streaming(&history).await {
        Ok(chunks) => {
            let relay = StreamRelay {
                metrics: state.metrics().clone(),
                provider,
                address,
                started,
                chunks: 0,
                finished: false,
            };
            sse_response(chunks, relay)
        }
        Err(e) => {
            tracing::error!(address = %address, error = %e, "failed to open provider stream");
            state.metrics().record_stream(&provider, StreamOutcome::Failed, started, 0);
            error_response(&e)
        }
    }
}

/// Relay chunks as SSE frames, ending with `[DONE]` or one error frame
fn sse_response(chunks: ChunkStream, relay: StreamRelay) -> Response {
    let mut chunks = chunks;
    let mut relay = relay;

    let events = async_stream::stream! {
        while let Some(result) = chunks.next().await {
            match result {
                Ok(chunk) => {
                    relay.on_chunk();
                    yield Event::default().json_data(&chunk);
                }
                Err(e) => {
                    tracing::error!(address = %relay.address, chunks = relay.chunks, error = %e, "provider stream failed");
                    relay.finish(StreamOutcome::Failed);
                    yield Ok(Event::default().data(error_body(&e).to_string()));
                    return;
                }
            }
        }

        relay.finish(StreamOutcome::Completed);
        yield Ok(Event::default().data("[DONE]"));
    };

    let headers = [
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        (HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no")),
    ];

    (headers, Sse::new(events).keep_alive(KeepAlive::default())).into_response()
}

/// Per-stream bookkeeping; a drop before `finish` means the client left
struct StreamRelay {
    metrics: StreamMetrics,
    provider: String,
    address: String,
    started: Instant,
    chunks: u64,
    finished: bool,
}

impl StreamRelay {
    fn on_chunk(&mut self) {
        if self.chunks == 0 {
            self.metrics.record_first_chunk(&self.provider, self.started.elapsed());
        }
        self.chunks += 1;
    }

    fn finish(&mut self, outcome: StreamOutcome) {
        self.finished = true;
        self.metrics.record_stream(&self.provider, outcome, self.started, self.chunks);

        if outcome == StreamOutcome::Completed {
            tracing::info!(
                address = %self.address,
                chunks = self.chunks,
                elapsed_ms = self.started.elapsed().as_millis(),
                "chat stream finished"
            );
        }
    }
}

impl Drop for StreamRelay {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(address = %self.address, chunks = self.chunks, "client disconnected mid-stream");
            self.metrics
                .record_stream(&self.provider, StreamOutcome::Disconnected, self.started, self.chunks);
        }
    }
}

fn error_response(error: &AgentError) -> Response {
    (error.status_code(), Json(error_body(error))).into_response()
}

/// Map an extractor rejection to the structured error body
fn rejection_response(rejection: &JsonRejection) -> Response {
    let status = rejection.status();
    tracing::debug!(status = %status, error = %rejection.body_text(), "rejected chat request");

    let body = serde_json::json!({
        "error": {
            "type": "validation_error",
            "message": rejection.body_text(),
        }
    });

    (status, Json(body)).into_response()
}
