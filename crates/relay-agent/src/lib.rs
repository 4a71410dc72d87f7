//! Chat agent crate for Relay
//!
//! An [`Agent`] streams completions from an OpenAI-compatible provider,
//! prepending its system prompt when the history has none. With the `http`
//! feature, [`chat_router`] exposes agents over `POST /chat/stream` as
//! server-sent events.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod accumulate;
pub mod agent;
mod convert;
pub mod error;
#[cfg(feature = "http")]
mod handler;
pub mod protocol;
pub mod provider;
mod state;
pub mod types;

pub use accumulate::StreamAccumulator;
pub use agent::{Agent, AgentConfig, prepare_history};
pub use error::AgentError;
#[cfg(feature = "http")]
pub use handler::{AgentRequest, chat_router};
pub use provider::{ChunkStream, Provider};
pub use state::AgentState;
pub use types::{Message, Role, StreamChunk};
