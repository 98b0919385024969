//! Gateway traits — the abstraction over the hosted LLM service.
//!
//! Two shapes of call exist:
//! - [`ChatProvider`]: stateless completion; the caller resends the whole
//!   context window every time.
//! - [`ImageProvider`]: stateful image generation; the service keeps the
//!   context and the caller threads a [`ResponseHandle`] forward, sending
//!   only the new input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::ContextMessage;
use crate::error::ProviderError;
use crate::image::ImagePayload;

/// A chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// The assembled context window
    pub messages: Vec<ContextMessage>,

    /// Temperature (0.0 = deterministic)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A complete response from a chat provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated answer text
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Opaque server-side reference to a previous response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHandle(pub String);

impl std::fmt::Display for ResponseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An image generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,

    /// Full first-call context, or just the incremental query when continuing
    pub input: Vec<ContextMessage>,

    /// Handle returned by the previous call; absent on the first call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response: Option<ResponseHandle>,
}

/// A generated image plus the handle to continue from.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub image: ImagePayload,
    pub handle: ResponseHandle,
    pub model: String,
}

/// Stateless text completion.
///
/// Every chat backend implements this trait; sessions call `complete()`
/// without knowing which one is behind it.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Stateful image generation.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate an image. Returns [`ProviderError::NoImageGenerated`] when the
    /// service answered without producing one.
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError>;
}
