use async_trait::async_trait;
use pptmaker_protocol::{GenerateContentRequest, GenerateContentResponse};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ModelError, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A hosted model that answers `generateContent` requests.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// Gemini REST client (`models/{model}:generateContent`).
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Rebuild the HTTP client with a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }
}

fn classify_failure(status: reqwest::StatusCode, body: &str) -> ModelError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|envelope| envelope.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    let api_status = parsed.and_then(|envelope| envelope.error.status);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ModelError::Auth(message);
    }
    if status == reqwest::StatusCode::GATEWAY_TIMEOUT
        || api_status.as_deref() == Some("DEADLINE_EXCEEDED")
    {
        return ModelError::Timeout;
    }
    ModelError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        tracing::debug!(
            "generateContent model={model} contents={} tools={}",
            request.contents.len(),
            request.tools.len()
        );

        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { ModelError::Timeout } else { ModelError::Http(e) })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| if e.is_timeout() { ModelError::Timeout } else { ModelError::Http(e) })?;

        if !status.is_success() {
            tracing::warn!("generateContent failed with HTTP {status}");
            return Err(classify_failure(status, &text));
        }

        let response: GenerateContentResponse = serde_json::from_str(&text)?;
        if response.candidates.is_empty() {
            if let Some(reason) = response.block_reason() {
                return Err(ModelError::Blocked(reason.to_string()));
            }
        }
        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                "generateContent usage prompt={} candidates={} total={}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = GeminiClient::new("test_key");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = GeminiClient::new("k").with_base_url("https://proxy.example.com/v1beta/");
        assert_eq!(
            client.endpoint("gemini-2.0-flash"),
            "https://proxy.example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_deadline_status_is_timeout() {
        let body = r#"{"error":{"code":504,"message":"Deadline expired","status":"DEADLINE_EXCEEDED"}}"#;
        let err = classify_failure(reqwest::StatusCode::GATEWAY_TIMEOUT, body);
        assert!(err.is_timeout());
    }

    #[test]
    fn test_error_message_extracted_from_envelope() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        match classify_failure(reqwest::StatusCode::TOO_MANY_REQUESTS, body) {
            ModelError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
