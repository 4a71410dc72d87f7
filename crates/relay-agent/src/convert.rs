//! Conversion from OpenAI wire chunks to internal stream chunks

use crate::protocol::{
    OpenAiStreamChoice, OpenAiStreamChunk, OpenAiStreamDelta, OpenAiStreamFunctionCall, OpenAiStreamToolCall,
    OpenAiUsage,
};
use crate::types::{
    CHUNK_OBJECT, ChunkChoice, ChunkDelta, FunctionCallDelta, StreamChunk, ToolCallDelta, Usage,
};

impl From<OpenAiStreamChunk> for StreamChunk {
    fn from(chunk: OpenAiStreamChunk) -> Self {
        Self {
            id: chunk.id.unwrap_or_default(),
            object: CHUNK_OBJECT.to_owned(),
            created: chunk.created.unwrap_or_default(),
            model: chunk.model.unwrap_or_default(),
            choices: chunk
                .choices
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            usage: chunk.usage.map(Into::into),
            extra: chunk.extra,
        }
    }
}

impl From<OpenAiStreamChoice> for ChunkChoice {
    fn from(choice: OpenAiStreamChoice) -> Self {
        Self {
            index: choice.index.unwrap_or_default(),
            delta: choice.delta.map(Into::into).unwrap_or_default(),
            finish_reason: choice.finish_reason,
            extra: choice.extra,
        }
    }
}

impl From<OpenAiStreamDelta> for ChunkDelta {
    fn from(delta: OpenAiStreamDelta) -> Self {
        Self {
            role: delta.role,
            content: delta.content,
            reasoning_content: delta.reasoning_content,
            tool_calls: delta
                .tool_calls
                .map(|calls| calls.into_iter().map(Into::into).collect()),
            extra: delta.extra,
        }
    }
}

impl From<OpenAiStreamToolCall> for ToolCallDelta {
    fn from(call: OpenAiStreamToolCall) -> Self {
        Self {
            index: call.index,
            id: call.id,
            tool_type: call.tool_type,
            function: call.function.map(Into::into),
        }
    }
}

impl From<OpenAiStreamFunctionCall> for FunctionCallDelta {
    fn from(function: OpenAiStreamFunctionCall) -> Self {
        Self {
            name: function.name,
            arguments: function.arguments,
        }
    }
}

impl From<OpenAiUsage> for Usage {
    fn from(usage: OpenAiUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}
