//! In-memory sink for tests and dry runs.

use async_trait::async_trait;
use chatdeck_core::error::SinkError;
use chatdeck_core::sink::LogSink;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Keeps every delivered message in order.
///
/// `fail_deliveries(true)` makes every subsequent `send` fail, which is how
/// the fail-closed path of the turn recorder gets exercised.
#[derive(Debug, Default)]
pub struct MemorySink {
    streams: RwLock<HashSet<String>>,
    entries: RwLock<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All delivered `(stream, message)` pairs, oldest first.
    pub async fn entries(&self) -> Vec<(String, String)> {
        self.entries.read().await.clone()
    }

    /// Delivered messages for one stream, oldest first.
    pub async fn messages(&self, stream: &str) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(s, _)| s == stream)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub async fn has_stream(&self, stream: &str) -> bool {
        self.streams.read().await.contains(stream)
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn setup(&self, stream: &str) -> Result<(), SinkError> {
        self.streams.write().await.insert(stream.to_string());
        Ok(())
    }

    async fn send(&self, stream: &str, message: &str) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::DeliveryFailed {
                stream: stream.into(),
                reason: "memory sink armed to fail".into(),
            });
        }
        if !self.has_stream(stream).await {
            return Err(SinkError::DeliveryFailed {
                stream: stream.into(),
                reason: "stream was never set up".into(),
            });
        }
        self.entries
            .write()
            .await
            .push((stream.to_string(), message.to_string()));
        Ok(())
    }
}
