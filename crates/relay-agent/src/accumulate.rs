//! Folding a chunk stream back into one assistant message

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::{Content, FunctionCall, Message, Role, StreamChunk, ToolCall, Usage};

/// Accumulates streamed chunks for the first choice
///
/// Tool call fragments are merged by index: `id` and `name` are replaced
/// when a fragment carries them, `arguments` are appended.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    reasoning: String,
    tool_calls: BTreeMap<u32, PartialToolCall>,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    tool_type: Option<String>,
    name: String,
    arguments: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &StreamChunk) {
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }

        let Some(choice) = chunk.choices.iter().find(|choice| choice.index == 0) else {
            return;
        };

        let delta = &choice.delta;
        if let Some(content) = &delta.content {
            self.content.push_str(content);
        }
        if let Some(reasoning) = &delta.reasoning_content {
            self.reasoning.push_str(reasoning);
        }

        for fragment in delta.tool_calls.iter().flatten() {
            let call = self.tool_calls.entry(fragment.index).or_default();

            if let Some(id) = &fragment.id {
                call.id.clone_from(id);
            }
            if fragment.tool_type.is_some() {
                call.tool_type.clone_from(&fragment.tool_type);
            }
            if let Some(function) = &fragment.function {
                if let Some(name) = &function.name {
                    call.name.clone_from(name);
                }
                if let Some(arguments) = &function.arguments {
                    call.arguments.push_str(arguments);
                }
            }
        }

        if choice.finish_reason.is_some() {
            self.finish_reason.clone_from(&choice.finish_reason);
        }
    }

    /// Text streamed so far
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Tool calls assembled so far, ordered by index
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls
            .values()
            .map(|call| ToolCall {
                id: call.id.clone(),
                tool_type: call.tool_type.clone().unwrap_or_else(|| "function".to_owned()),
                function: FunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect()
    }

    /// The assistant message the stream amounted to
    pub fn into_message(self) -> Message {
        let tool_calls = self.tool_calls();

        let mut extra = Map::new();
        if !self.reasoning.is_empty() {
            extra.insert("reasoning_content".to_owned(), Value::String(self.reasoning));
        }

        Message {
            role: Role::Assistant,
            content: (!self.content.is_empty()).then_some(Content::Text(self.content)),
            name: None,
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
            extra,
        }
    }
}
