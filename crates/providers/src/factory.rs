//! Build gateways from configuration.

use std::sync::Arc;

use chatdeck_config::AppConfig;
use chatdeck_core::provider::{ChatProvider, ImageProvider};

use crate::openai_compat::OpenAiCompatProvider;
use crate::openai_responses::OpenAiResponsesProvider;

/// Provider name reported for the public endpoint; anything else is "custom".
fn provider_name(config: &AppConfig) -> &'static str {
    if config.api_url.trim_end_matches('/') == chatdeck_config::DEFAULT_API_URL {
        "openai"
    } else {
        "custom"
    }
}

pub fn build_chat_provider(config: &AppConfig, api_key: &str) -> Arc<dyn ChatProvider> {
    Arc::new(OpenAiCompatProvider::new(
        provider_name(config),
        &config.api_url,
        api_key,
    ))
}

pub fn build_image_provider(config: &AppConfig, api_key: &str) -> Arc<dyn ImageProvider> {
    Arc::new(OpenAiResponsesProvider::new(
        provider_name(config),
        &config.api_url,
        api_key,
    ))
}
