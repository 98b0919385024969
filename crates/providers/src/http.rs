//! HTTP plumbing shared by the OpenAI gateways.

use chatdeck_core::error::ProviderError;
use std::time::Duration;
use tracing::warn;

/// Request timeout for every hosted-model call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map a non-success status onto the provider error taxonomy.
pub(crate) fn status_error(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        401 | 403 => {
            ProviderError::AuthenticationFailed("Invalid API key or insufficient permissions".into())
        }
        _ => {
            warn!(status, body = %body, "Provider returned error");
            ProviderError::ApiError {
                status_code: status,
                message: body,
            }
        }
    }
}

/// Send `body` as JSON and hand back the successful response.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<reqwest::Response, ProviderError> {
    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(send_error)?;

    let status = response.status().as_u16();
    if status != 200 {
        let error_body = response.text().await.unwrap_or_default();
        return Err(status_error(status, error_body));
    }
    Ok(response)
}

pub(crate) fn parse_error(e: impl std::fmt::Display) -> ProviderError {
    ProviderError::ApiError {
        status_code: 200,
        message: format!("Failed to parse response: {e}"),
    }
}
