//! OpenAI chat-completions gateway.
//!
//! Works with OpenAI and any endpoint exposing a compatible
//! `/chat/completions` route. Handles text-only and vision conversations:
//! multi-part user messages become `text` / `image_url` content parts.

use async_trait::async_trait;
use chatdeck_core::context::{ContentPart, ContextMessage, MessageContent};
use chatdeck_core::error::ProviderError;
use chatdeck_core::provider::{ChatProvider, ChatRequest, ChatResponse, Usage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

/// A chat-completions provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http::build_client(),
        }
    }

    /// OpenAI at its public endpoint.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", chatdeck_config::DEFAULT_API_URL, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn to_api_messages(messages: &[ContextMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.as_str().into(),
                content: match &m.content {
                    MessageContent::Text(text) => ApiContent::Text(text.clone()),
                    MessageContent::Parts(parts) => {
                        ApiContent::Parts(parts.iter().map(ApiPart::from).collect())
                    }
                },
            })
            .collect()
    }

    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    fn parse_response(api_response: ApiResponse) -> Result<ChatResponse, ProviderError> {
        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: api_response.model,
            usage,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = http::post_json(&self.client, &url, &self.api_key, &body).await?;
        let api_response: ApiResponse = response.json().await.map_err(http::parse_error)?;
        Self::parse_response(api_response)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(http::send_error)?;

        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Parts(Vec<ApiPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiPart {
    Text { text: String },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize)]
struct ApiImageUrl {
    url: String,
}

impl From<&ContentPart> for ApiPart {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => ApiPart::Text { text: text.clone() },
            ContentPart::Image { data_url } => ApiPart::ImageUrl {
                image_url: ApiImageUrl {
                    url: data_url.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
