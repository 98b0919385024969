//! Sink that forwards turn records to the `tracing` subscriber.

use async_trait::async_trait;
use chatdeck_core::error::SinkError;
use chatdeck_core::sink::LogSink;
use tracing::info;

/// Emits each record as an `info` event on the `chatdeck::turns` target.
///
/// Filter with `RUST_LOG=chatdeck::turns=info`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn setup(&self, _stream: &str) -> Result<(), SinkError> {
        Ok(())
    }

    async fn send(&self, stream: &str, message: &str) -> Result<(), SinkError> {
        info!(target: "chatdeck::turns", stream, record = message, "turn");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracing_sink_never_fails() {
        let sink = TracingSink::new();
        sink.setup("01_chat").await.unwrap();
        sink.setup("01_chat").await.unwrap();
        sink.send("01_chat", r#"{"role":"user"}"#).await.unwrap();
        assert_eq!(sink.name(), "tracing");
    }
}
