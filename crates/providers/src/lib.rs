//! Hosted model gateways for ChatDeck.
//!
//! - [`OpenAiCompatProvider`] implements `ChatProvider` over `/chat/completions`
//! - [`OpenAiResponsesProvider`] implements `ImageProvider` over `/responses`

pub mod factory;
mod http;
pub mod openai_compat;
pub mod openai_responses;

pub use factory::{build_chat_provider, build_image_provider};
pub use http::REQUEST_TIMEOUT;
pub use openai_compat::OpenAiCompatProvider;
pub use openai_responses::OpenAiResponsesProvider;
