//! Raw HTTP clients for the supported text-generation APIs.
//!
//! No editor awareness. Just makes API calls via reqwest.

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use super::types::{
    extract_error_message, ChatRequest, ChatResponse, GenerateContentRequest,
    GenerateContentResponse, Generation, GenerationRequest,
};
use crate::config::Provider;

/// Errors from LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),

    #[error("no model configured: set `model` in the config file or SCRIBE_MODEL")]
    MissingModel,

    #[error("no text in response (reason: {reason})")]
    Empty { reason: String },
}

impl LlmError {
    /// Configuration problems, as opposed to provider failures.
    pub fn is_config(&self) -> bool {
        matches!(self, LlmError::MissingApiKey(_) | LlmError::MissingModel)
    }
}

/// A provider endpoint the gateway can call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;
}

/// Map 429 and error statuses; pass successful responses through.
async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(LlmError::RateLimited { retry_after });
    }

    if status >= 400 {
        let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
        return Err(LlmError::ApiError {
            status,
            message: extract_error_message(&body),
        });
    }

    Ok(response)
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL.into())
    }

    /// Create a client with a custom base URL (for testing with mock servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let url = self.url(&request.model);
        debug!(%url, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&GenerateContentRequest::from(request))
            .send()
            .await?;

        let resp: GenerateContentResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(resp.into())
    }
}

/// Client for OpenAI-compatible chat completion endpoints.
#[derive(Debug)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL.into())
    }

    /// Create a client with a custom base URL (local servers, proxies, mocks).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let url = self.url();
        debug!(%url, "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest::from(request))
            .send()
            .await?;

        let resp: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(resp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_client_creation() {
        let client = GeminiClient::new("test-key".into());
        assert_eq!(client.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(
            client.url("gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn openai_custom_base_url_trims_slash() {
        let client = OpenAiClient::with_base_url("test-key".into(), "http://localhost:8080/v1/".into());
        assert_eq!(client.url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.provider(), Provider::OpenAi);
    }

    #[test]
    fn error_display() {
        let err = LlmError::ApiError {
            status: 401,
            message: "invalid api key".into(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));

        let err = LlmError::RateLimited {
            retry_after: Some(30),
        };
        assert!(err.to_string().contains("rate limited"));

        let err = LlmError::Empty {
            reason: "SAFETY".into(),
        };
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(LlmError::MissingModel.is_config());
        assert!(LlmError::MissingApiKey("x".into()).is_config());
        assert!(!LlmError::InvalidResponse("x".into()).is_config());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let client = GeminiClient::with_base_url("key".into(), "http://127.0.0.1:9".into());
        let request = GenerationRequest {
            model: "m".into(),
            content: "hello there friend".into(),
            system_prompt: "p".into(),
            max_output_tokens: None,
            temperature: None,
        };
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }
}
