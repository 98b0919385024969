//! # ChatDeck Core
//!
//! Domain types, traits, and error definitions for the ChatDeck LLM front-end.
//! This crate has no I/O-framework dependencies — it defines the domain model
//! that all other crates implement against.
//!
//! Every external collaborator (LLM service, log sink, secret store, prompt
//! file) is a trait here. Implementations live in their respective crates,
//! which keeps sessions testable against scripted stand-ins.

pub mod context;
pub mod error;
pub mod image;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod secret;
pub mod sink;

// Re-export key types at crate root for ergonomics
pub use context::{ContentPart, ContextMessage, MessageContent, MessageRole};
pub use error::{Error, ImageError, ProviderError, Result, SecretError, SinkError};
pub use image::ImagePayload;
pub use message::{ConversationStore, SessionId, Speaker, Turn};
pub use prompt::{FilePrompt, InlinePrompt, PromptSource};
pub use provider::{
    ChatProvider, ChatRequest, ChatResponse, ImageProvider, ImageRequest, ImageResponse,
    ResponseHandle, Usage,
};
pub use secret::SecretSource;
pub use sink::LogSink;
