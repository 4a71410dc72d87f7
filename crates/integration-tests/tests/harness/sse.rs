//! Reading relayed SSE bodies

use relay_agent::{StreamAccumulator, StreamChunk};

pub const DONE: &str = "[DONE]";

/// Payloads of the `data:` lines, in order; comment lines are ignored
pub fn data_frames(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with("data: "))
        .map(|line| line.trim_start_matches("data: ").to_owned())
        .collect()
}

/// Parse every frame except the `[DONE]` sentinel as a chunk
pub fn chunks(frames: &[String]) -> Vec<StreamChunk> {
    frames
        .iter()
        .filter(|frame| frame.as_str() != DONE)
        .map(|frame| serde_json::from_str(frame).expect("frame is a chunk"))
        .collect()
}

/// Concatenated content of all chunks
pub fn content(frames: &[String]) -> String {
    let mut accumulator = StreamAccumulator::new();
    for chunk in chunks(frames) {
        accumulator.push(&chunk);
    }
    accumulator.content().to_owned()
}
