//! Mock LLM backend server for integration tests
//!
//! Implements the streaming half of an OpenAI-compatible chat completions
//! API and records every request it receives

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// What the mock does with a completion request
#[derive(Debug, Clone)]
enum Behavior {
    /// Stream one chunk per word of the text
    Words(String),
    /// Stream the request's system prompt back, one word per chunk
    EchoSystemPrompt,
    /// Stream a `get_weather` tool call in fragments
    ToolCall,
    /// Answer 500 with a JSON error
    Fail,
    /// Answer 200 with a plain JSON completion
    PlainJson,
    /// Stream this many word chunks, then an in-stream error event
    BreakAfter(usize),
    /// Send this many frames, then abort the connection mid-body
    DropAfter(usize),
}

/// Mock LLM backend that returns predictable responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    completion_count: AtomicU32,
    behavior: Behavior,
    chunk_delay: Duration,
    requests: Mutex<Vec<Value>>,
    authorizations: Mutex<Vec<Option<String>>>,
}

impl MockLlm {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Words("Hello from mock LLM".to_owned()), Duration::ZERO).await
    }

    /// Start a mock server that streams `content` word by word
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Words(content.to_owned()), Duration::ZERO).await
    }

    /// Start a mock server that streams back the system prompt it received
    pub async fn start_echo_system_prompt(chunk_delay: Duration) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::EchoSystemPrompt, chunk_delay).await
    }

    /// Start a mock server that streams a tool call
    pub async fn start_with_tool_call() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::ToolCall, Duration::ZERO).await
    }

    /// Start a mock server that fails every request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Fail, Duration::ZERO).await
    }

    /// Start a mock server that ignores `stream: true` and answers with JSON
    pub async fn start_plain_json() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::PlainJson, Duration::ZERO).await
    }

    /// Start a mock server whose stream breaks after `words` content chunks
    pub async fn start_breaking_after(words: usize) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::BreakAfter(words), Duration::ZERO).await
    }

    /// Start a mock server that cuts the connection after `frames` frames
    pub async fn start_dropping_after(frames: usize) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::DropAfter(frames), Duration::ZERO).await
    }

    async fn start_inner(behavior: Behavior, chunk_delay: Duration) -> anyhow::Result<Self> {
        let state = Arc::new(MockLlmState {
            completion_count: AtomicU32::new(0),
            behavior,
            chunk_delay,
            requests: Mutex::new(Vec::new()),
            authorizations: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    ///
    /// Includes `/v1` since the provider appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Bodies of all completion requests, in arrival order
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The most recent completion request body
    pub fn last_request(&self) -> Value {
        self.requests().pop().expect("mock received a request")
    }

    /// `Authorization` headers of all completion requests
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.authorizations.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Handlers --

async fn handle_chat_completions(
    State(state): State<Arc<MockLlmState>>,
    headers: HeaderMap,
    Json(req): Json<Value>,
) -> Response {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    state.requests.lock().unwrap().push(req.clone());
    state.authorizations.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    );

    let model = req["model"].as_str().unwrap_or("mock-model").to_owned();

    let frames = match &state.behavior {
        Behavior::Fail => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": {
                        "message": "mock server intentional failure",
                        "type": "server_error"
                    }
                })),
            )
                .into_response();
        }
        Behavior::PlainJson => {
            return Json(json!({
                "id": "chatcmpl-test-123",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": model,
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "not a stream"},
                    "finish_reason": "stop"
                }]
            }))
            .into_response();
        }
        Behavior::Words(text) => word_frames(&model, text, None),
        Behavior::EchoSystemPrompt => word_frames(&model, &system_prompt(&req), None),
        Behavior::BreakAfter(words) => word_frames(&model, "one two three four five six", Some(*words)),
        Behavior::ToolCall => tool_call_frames(&model),
        Behavior::DropAfter(count) => {
            let mut frames = word_frames(&model, "one two three four five six", None);
            frames.truncate(*count);
            frames
        }
    };

    let abort = matches!(state.behavior, Behavior::DropAfter(_));
    let delay = state.chunk_delay;
    let body = futures_util::stream::iter(frames)
        .map(Some)
        .chain(futures_util::stream::iter(abort.then_some(None)))
        .then(move |frame| async move {
            match frame {
                Some(frame) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(frame)
                }
                None => {
                    // Let the earlier frames reach the client before the reset
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "mock connection dropped"))
                }
            }
        });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(body),
    )
        .into_response()
}

fn system_prompt(req: &Value) -> String {
    req["messages"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|m| m["role"] == "system")
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_owned()
}

fn frame(data: &Value) -> String {
    format!("data: {data}\n\n")
}

fn chunk(model: &str, delta: &Value, finish_reason: Option<&str>) -> Value {
    json!({
        "id": "chatcmpl-test-stream",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}]
    })
}

/// Role chunk, one chunk per word, finish chunk, usage chunk, filter
/// results chunk, `[DONE]`
///
/// With `break_after`, an error event follows that many words instead.
fn word_frames(model: &str, text: &str, break_after: Option<usize>) -> Vec<String> {
    let mut frames = vec![frame(&chunk(model, &json!({"role": "assistant", "content": ""}), None))];

    for (i, word) in text.split_whitespace().enumerate() {
        if break_after == Some(i) {
            frames.push(frame(&json!({"error": {"message": "mock stream interrupted", "type": "server_error"}})));
            return frames;
        }
        frames.push(frame(&chunk(model, &json!({"content": format!("{word} ")}), None)));
    }

    frames.push(frame(&chunk(model, &json!({}), Some("stop"))));
    frames.push(frame(&json!({
        "id": "chatcmpl-test-stream",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": model,
        "choices": [],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })));
    // Choice-less chunk carrying only provider-specific data
    frames.push(frame(&json!({
        "id": "chatcmpl-test-stream",
        "choices": [],
        "prompt_filter_results": [{"prompt_index": 0, "content_filter_results": {}}]
    })));
    frames.push("data: [DONE]\n\n".to_owned());
    frames
}

fn tool_call_frames(model: &str) -> Vec<String> {
    vec![
        frame(&chunk(
            model,
            &json!({
                "role": "assistant",
                "tool_calls": [{
                    "index": 0,
                    "id": "call_test_stream",
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": ""}
                }]
            }),
            None,
        )),
        frame(&chunk(
            model,
            &json!({"tool_calls": [{"index": 0, "function": {"arguments": "{\"location\":"}}]}),
            None,
        )),
        frame(&chunk(
            model,
            &json!({"tool_calls": [{"index": 0, "function": {"arguments": "\"Paris\"}"}}]}),
            None,
        )),
        frame(&chunk(model, &json!({}), Some("tool_calls"))),
        "data: [DONE]\n\n".to_owned(),
    ]
}
