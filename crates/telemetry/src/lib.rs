//! Conversation logging for ChatDeck.
//!
//! Each completed turn is shipped as a [`TurnLogRecord`] to a [`LogSink`]
//! stream. Streams are grouped: one group per installation, one stream per
//! page.
//!
//! Sinks:
//! - [`JsonlSink`]: JSON-lines files under `<dir>/<group>/<stream>.jsonl`
//! - [`TracingSink`]: `info` events on the `chatdeck::turns` target
//! - [`MemorySink`]: in-process buffer, used by tests
//!
//! [`LogSink`]: chatdeck_core::LogSink

pub mod jsonl;
pub mod memory;
pub mod record;
pub mod tracing_sink;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;
pub use record::TurnLogRecord;
pub use tracing_sink::TracingSink;
