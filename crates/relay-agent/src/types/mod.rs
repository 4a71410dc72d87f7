mod chunk;
mod message;
mod request;
mod tool;

pub use chunk::{CHUNK_OBJECT, ChunkChoice, ChunkDelta, FunctionCallDelta, StreamChunk, ToolCallDelta, Usage};
pub use message::{Content, FunctionCall, Message, Role, ToolCall};
pub use request::{CompletionRequest, ResponseFormat};
pub use tool::{FunctionDefinition, ToolDefinition};
