//! Error types for the ChatDeck domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ResponseHandle;

/// The top-level error type for all ChatDeck operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Log sink errors ---
    #[error("Log sink error: {0}")]
    Sink(#[from] SinkError),

    // --- Credential errors ---
    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    // --- Image payload errors ---
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    // --- Prompt loading ---
    #[error("Failed to load prompt {path}: {reason}")]
    Prompt { path: PathBuf, reason: String },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error(
        "No image was generated. Try a concrete instruction such as \"draw a cat sitting on a windowsill\"."
    )]
    NoImageGenerated {
        /// Handle of the answer that came back without an image, if any.
        handle: Option<ResponseHandle>,
    },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to set up log stream {stream}: {reason}")]
    Setup { stream: String, reason: String },

    #[error("Failed to deliver log event to {stream}: {reason}")]
    DeliveryFailed { stream: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Failed to fetch secret '{name}': {reason}")]
    FetchFailed { name: String, reason: String },

    #[error("API key not found in secret '{name}' (expected a plain value or a '{field}' field)")]
    Missing { name: String, field: String },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image format: {0} (expected png, jpg or jpeg)")]
    UnsupportedFormat(String),

    #[error("Invalid base64 image payload: {0}")]
    InvalidPayload(String),
}
