//! File-backed log sink: one directory per log group, one JSON-lines file
//! per stream.
//!
//! ```text
//! <root>/<group>/<stream>.jsonl
//! {"timestamp":1718000000000,"message":"{\"id\":...}"}
//! ```

use async_trait::async_trait;
use chatdeck_core::error::SinkError;
use chatdeck_core::sink::LogSink;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A single line in a stream file.
#[derive(Debug, Serialize)]
struct LogEvent<'a> {
    /// Milliseconds since the Unix epoch (UTC)
    timestamp: i64,
    message: &'a str,
}

pub struct JsonlSink {
    group_dir: PathBuf,
}

impl JsonlSink {
    pub fn new(root: impl AsRef<Path>, group: &str) -> Self {
        Self {
            group_dir: root.as_ref().join(group),
        }
    }

    pub fn stream_path(&self, stream: &str) -> PathBuf {
        self.group_dir.join(format!("{stream}.jsonl"))
    }

    fn check_stream_name(stream: &str) -> Result<(), SinkError> {
        if stream.is_empty() || stream.contains(['/', '\\']) || stream.starts_with('.') {
            return Err(SinkError::Setup {
                stream: stream.into(),
                reason: "stream names must be plain file names".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn setup(&self, stream: &str) -> Result<(), SinkError> {
        Self::check_stream_name(stream)?;
        let setup_err = |e: std::io::Error| SinkError::Setup {
            stream: stream.into(),
            reason: e.to_string(),
        };

        // Both steps succeed when the group or stream already exists.
        tokio::fs::create_dir_all(&self.group_dir)
            .await
            .map_err(setup_err)?;
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.stream_path(stream))
            .await
            .map_err(setup_err)?;

        debug!(group = %self.group_dir.display(), stream, "Log stream ready");
        Ok(())
    }

    async fn send(&self, stream: &str, message: &str) -> Result<(), SinkError> {
        let delivery_err = |reason: String| SinkError::DeliveryFailed {
            stream: stream.into(),
            reason,
        };

        let event = LogEvent {
            timestamp: Utc::now().timestamp_millis(),
            message,
        };
        let mut line = serde_json::to_string(&event).map_err(|e| delivery_err(e.to_string()))?;
        line.push('\n');

        // No `create`: sending to a stream that was never set up is an error.
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(self.stream_path(stream))
            .await
            .map_err(|e| delivery_err(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| delivery_err(e.to_string()))?;
        file.flush().await.map_err(|e| delivery_err(e.to_string()))?;

        Ok(())
    }
}
