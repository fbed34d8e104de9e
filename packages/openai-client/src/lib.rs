//! Pure OpenAI REST API client
//!
//! A clean, minimal client for the OpenAI chat completions API with no
//! domain-specific logic. Supports plain chat completions and JSON-schema
//! structured outputs, including multimodal messages with inline images.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{ContentPart, Message, OpenAIClient, StructuredOutput, StructuredRequest};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! let request = StructuredRequest::with_messages(
//!     "gpt-4o",
//!     vec![
//!         Message::system("Describe the picture."),
//!         Message::user_parts(vec![ContentPart::image_url("data:image/png;base64,...")]),
//!     ],
//!     Caption::openai_schema(),
//! );
//! let json = client.structured_output(request).await?;
//! ```
//!
//! # Type-Safe Structured Output
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct Post {
//!     title: String,
//!     description: String,
//! }
//!
//! let post: Post = client.extract::<Post>("gpt-4o", system_prompt, user_prompt).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, local mocks, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Type-safe structured output extraction from text prompts.
    ///
    /// Generates a JSON schema from `T` using `schemars`, sends it to OpenAI,
    /// and deserializes the response.
    pub async fn extract<T: StructuredOutput>(
        &self,
        model: &str,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let schema = T::openai_schema();

        debug!(
            type_name = T::type_name(),
            schema = %serde_json::to_string_pretty(&schema).unwrap_or_default(),
            "Generated OpenAI schema for extraction"
        );

        let request = StructuredRequest::new(model, system_prompt, user_prompt, schema)
            .with_schema_name(T::type_name());
        let json_str = self.structured_output(request).await?;

        serde_json::from_str(strip_code_blocks(&json_str)).map_err(|e| {
            OpenAIError::Parse(format!("Failed to deserialize response: {}", e))
        })
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let chat_response = self.post_chat(&request).await?;
        let usage = chat_response.usage.clone();
        let content = first_content(chat_response)?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse { content, usage })
    }

    /// Structured output with JSON schema.
    ///
    /// Uses OpenAI's `json_schema` response format. Returns the raw JSON text
    /// of the first choice; validating it is the caller's job.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<String> {
        let start = std::time::Instant::now();

        let chat_response = self.post_chat(&request).await?;
        let content = first_content(chat_response)?;

        debug!(
            model = %request.model,
            schema_name = %request.response_format.json_schema.name,
            duration_ms = start.elapsed().as_millis(),
            response_length = content.len(),
            "OpenAI structured output"
        );

        Ok(content)
    }

    async fn post_chat<B: Serialize>(&self, body: &B) -> Result<ChatResponseRaw> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))
    }
}

fn first_content(response: ChatResponseRaw) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| OpenAIError::Api("No response from OpenAI".into()))?;

    if let Some(refusal) = message.refusal {
        return Err(OpenAIError::Refusal(refusal));
    }

    message
        .content
        .ok_or_else(|| OpenAIError::Api("OpenAI response had no content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key(), "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com");
    }

    #[test]
    fn test_default_base_url() {
        let client = OpenAIClient::new("sk-test");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    fn raw(value: serde_json::Value) -> ChatResponseRaw {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_refusal_maps_to_refusal_error() {
        let err = first_content(raw(serde_json::json!({
            "choices": [{"message": {"content": null, "refusal": "I can't help with that."}}]
        })))
        .unwrap_err();

        assert!(matches!(err, OpenAIError::Refusal(ref r) if r == "I can't help with that."));
    }

    #[test]
    fn test_missing_content_maps_to_api_error() {
        let null_content = first_content(raw(serde_json::json!({
            "choices": [{"message": {"content": null}}]
        })))
        .unwrap_err();
        assert!(matches!(null_content, OpenAIError::Api(_)));

        let no_choices = first_content(raw(serde_json::json!({ "choices": [] }))).unwrap_err();
        assert!(matches!(no_choices, OpenAIError::Api(_)));
    }
}
