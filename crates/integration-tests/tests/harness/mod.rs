//! Shared helpers; each test binary uses a different subset
#![allow(dead_code)]

pub mod config;
pub mod mock_llm;
pub mod server;
pub mod sse;

/// Body for `POST /chat/stream`
pub fn chat_request(provider: &str, model: &str, system_prompt: &str, history: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "provider": provider,
        "system_prompt": system_prompt,
        "model": model,
        "history": history,
    })
}

/// A single user turn
pub fn user_turn(text: &str) -> serde_json::Value {
    serde_json::json!([{"role": "user", "content": text}])
}
