// AI implementation using OpenAI
//
// This is the infrastructure implementation of BaseVisionAI.
// Business logic (what to prompt for) lives in domain layers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use openai_client::{ContentPart, Message, OpenAIClient, StructuredRequest};

use super::{BaseVisionAI, VisionRequest};

/// OpenAI implementation of vision capabilities
#[derive(Clone)]
pub struct OpenAIVision {
    client: OpenAIClient,
    model: String,
}

impl OpenAIVision {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The exact request sent to the chat completions endpoint.
    pub fn build_request(&self, request: VisionRequest) -> StructuredRequest {
        let parts = request
            .images
            .iter()
            .map(|image| ContentPart::image_url(image.data_uri()))
            .collect();

        StructuredRequest::with_messages(
            self.model.as_str(),
            vec![
                Message::system(request.system_prompt),
                Message::user_parts(parts),
            ],
            request.schema,
        )
        .with_schema_name(request.schema_name)
        .temperature(0.0)
    }
}

#[async_trait]
impl BaseVisionAI for OpenAIVision {
    async fn generate_structured(&self, request: VisionRequest) -> Result<String> {
        let image_count = request.images.len();
        let payload_bytes: usize = request.images.iter().map(|i| i.base64.len()).sum();

        tracing::debug!(
            model = %self.model,
            image_count,
            payload_bytes,
            schema_name = %request.schema_name,
            "Calling OpenAI vision API"
        );

        let response = self
            .client
            .structured_output(self.build_request(request))
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    network = e.is_network(),
                    model = %self.model,
                    "OpenAI vision call failed"
                );
                e
            })
            .context("Failed to call OpenAI API")?;

        tracing::info!(
            response_length = response.len(),
            model = %self.model,
            "OpenAI vision response received"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::image::{encode_image_to_base64, EncodedImage};
    use serde_json::json;

    fn vision_request() -> VisionRequest {
        VisionRequest {
            system_prompt: "Look closely.".into(),
            images: vec![
                EncodedImage {
                    base64: encode_image_to_base64(b"front"),
                    mime_type: "image/png",
                },
                EncodedImage {
                    base64: encode_image_to_base64(b"back"),
                    mime_type: "image/jpeg",
                },
            ],
            schema_name: "BookListing".into(),
            schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn request_carries_images_in_order_with_zero_temperature() {
        let vision = OpenAIVision::new(OpenAIClient::new("sk-test"), "gpt-4o");
        let body = serde_json::to_value(vision.build_request(vision_request())).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "Look closely."}));
        assert_eq!(
            body["messages"][1]["content"],
            json!([
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,ZnJvbnQ="}},
                {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,YmFjaw=="}}
            ])
        );
        assert_eq!(body["response_format"]["json_schema"]["name"], "BookListing");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }
}
