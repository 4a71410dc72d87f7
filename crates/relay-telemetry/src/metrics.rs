//! Metric names and the instruments recorded per chat stream

use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

pub const CHAT_STREAM_COUNT: &str = "chat.stream.count";
pub const CHAT_STREAM_DURATION: &str = "chat.stream.duration";
pub const CHAT_STREAM_CHUNKS: &str = "chat.stream.chunks";
pub const CHAT_STREAM_TIME_TO_FIRST_CHUNK: &str = "chat.stream.time_to_first_chunk";

/// How a relayed stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Provider finished and the `[DONE]` frame was sent
    Completed,
    /// Provider or transport failed mid-stream
    Failed,
    /// Client went away before the stream finished
    Disconnected,
}

impl StreamOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Instruments for chat stream metrics
///
/// Backed by the global meter provider, so recording is a no-op when no
/// exporter is configured.
#[derive(Clone)]
pub struct StreamMetrics {
    count: Counter<u64>,
    duration: Histogram<f64>,
    chunks: Histogram<u64>,
    time_to_first_chunk: Histogram<f64>,
}

impl StreamMetrics {
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter("relay");

        Self {
            count: meter
                .u64_counter(CHAT_STREAM_COUNT)
                .with_description("Chat streams relayed, by provider and outcome")
                .build(),
            duration: meter
                .f64_histogram(CHAT_STREAM_DURATION)
                .with_unit("s")
                .with_description("Wall time from dispatch to end of stream")
                .build(),
            chunks: meter
                .u64_histogram(CHAT_STREAM_CHUNKS)
                .with_description("Chunks relayed per stream")
                .build(),
            time_to_first_chunk: meter
                .f64_histogram(CHAT_STREAM_TIME_TO_FIRST_CHUNK)
                .with_unit("s")
                .build(),
        }
    }

    /// Record the first chunk of a stream
    pub fn record_first_chunk(&self, provider: &str, elapsed: Duration) {
        self.time_to_first_chunk
            .record(elapsed.as_secs_f64(), &[KeyValue::new("provider", provider.to_owned())]);
    }

    /// Record a finished stream
    pub fn record_stream(&self, provider: &str, outcome: StreamOutcome, started: Instant, chunks: u64) {
        let attributes = [
            KeyValue::new("provider", provider.to_owned()),
            KeyValue::new("outcome", outcome.as_str()),
        ];

        self.count.add(1, &attributes);
        self.duration.record(started.elapsed().as_secs_f64(), &attributes);
        self.chunks.record(chunks, &attributes);
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}
