//! OpenAI responses gateway for image generation.
//!
//! Every request enables the `image_generation` tool. Conversations are
//! stateful on the service side: passing the previous response id lets the
//! model see earlier prompts and images without resending them.

use async_trait::async_trait;
use chatdeck_core::context::{ContentPart, ContextMessage, MessageContent};
use chatdeck_core::error::ProviderError;
use chatdeck_core::image::ImagePayload;
use chatdeck_core::provider::{ImageProvider, ImageRequest, ImageResponse, ResponseHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http;

pub struct OpenAiResponsesProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiResponsesProvider {
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

    fn to_api_input(messages: &[ContextMessage]) -> Vec<ApiInputMessage> {
        messages
            .iter()
            .map(|m| ApiInputMessage {
                role: m.role.as_str().into(),
                content: match &m.content {
                    MessageContent::Text(text) => ApiInputContent::Text(text.clone()),
                    MessageContent::Parts(parts) => {
                        ApiInputContent::Parts(parts.iter().map(ApiInputPart::from).collect())
                    }
                },
            })
            .collect()
    }

    fn request_body(request: &ImageRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "input": Self::to_api_input(&request.input),
            "tools": [{"type": "image_generation"}],
        });

        if let Some(previous) = &request.previous_response {
            body["previous_response_id"] = serde_json::json!(previous.0);
        }
        body
    }

    /// Pull the first generated image out of the response output.
    /// A response without an image still carries its id, so the caller can
    /// continue from the turn where the model answered in text.
    fn parse_response(api_response: ApiResponse) -> Result<ImageResponse, ProviderError> {
        let handle = ResponseHandle(api_response.id);
        let Some(image) = api_response
            .output
            .into_iter()
            .filter(|item| item.kind == "image_generation_call")
            .find_map(|item| item.result.filter(|r| !r.is_empty()))
        else {
            return Err(ProviderError::NoImageGenerated {
                handle: Some(handle),
            });
        };

        Ok(ImageResponse {
            image: ImagePayload::from_base64(image),
            handle,
            model: api_response.model,
        })
    }
}

#[async_trait]
impl ImageProvider for OpenAiResponsesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse, ProviderError> {
        let url = format!("{}/responses", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            continuation = request.previous_response.is_some(),
            "Sending image generation request"
        );

        let response = http::post_json(&self.client, &url, &self.api_key, &body).await?;
        let api_response: ApiResponse = response.json().await.map_err(http::parse_error)?;
        Self::parse_response(api_response)
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiInputMessage {
    role: String,
    content: ApiInputContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiInputContent {
    Text(String),
    Parts(Vec<ApiInputPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiInputPart {
    InputText { text: String },
    InputImage { image_url: String },
}

impl From<&ContentPart> for ApiInputPart {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => ApiInputPart::InputText { text: text.clone() },
            ContentPart::Image { data_url } => ApiInputPart::InputImage {
                image_url: data_url.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    output: Vec<ApiOutputItem>,
}

#[derive(Debug, Deserialize)]
struct ApiOutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    result: Option<String>,
}
