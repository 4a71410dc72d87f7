//! Provider trait and the OpenAI-compatible implementation

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::AgentError;
use crate::types::{CompletionRequest, StreamChunk};

/// Lazily produced stream of chunks; an `Err` item ends the stream
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AgentError>> + Send>>;

/// Trait implemented by each LLM provider backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name the provider is addressed by
    fn name(&self) -> &str;

    /// Dispatch a streaming completion
    ///
    /// Failures before the first chunk are returned directly; later
    /// failures appear as a final `Err` item.
    async fn stream(&self, request: &CompletionRequest) -> Result<ChunkStream, AgentError>;
}
