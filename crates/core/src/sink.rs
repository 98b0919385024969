//! Log sink trait — where shipped turn records go.
//!
//! A sink is an append-only store of `(stream, message)` pairs. Each send is
//! independent; callers treat any failure as fatal to the current interaction.

use async_trait::async_trait;

use crate::error::SinkError;

#[async_trait]
pub trait LogSink: Send + Sync {
    fn name(&self) -> &str;

    /// Prepare a stream for writing. Calling this for a stream that already
    /// exists is not an error.
    async fn setup(&self, stream: &str) -> Result<(), SinkError>;

    /// Append one message to a stream.
    async fn send(&self, stream: &str, message: &str) -> Result<(), SinkError>;
}
