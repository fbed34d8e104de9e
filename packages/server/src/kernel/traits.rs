// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// What to prompt for lives in the domain layer (domains/listings).
//
// Naming convention: Base* for trait names (e.g., BaseVisionAI)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::image::EncodedImage;

// =============================================================================
// Vision AI Trait (Infrastructure - multimodal structured output)
// =============================================================================

/// One schema-constrained request over inline images.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub system_prompt: String,
    /// Attached in order
    pub images: Vec<EncodedImage>,
    pub schema_name: String,
    pub schema: serde_json::Value,
}

#[async_trait]
pub trait BaseVisionAI: Send + Sync {
    /// Send the request once and return the raw JSON reply.
    /// Validating it against the schema is the caller's job.
    async fn generate_structured(&self, request: VisionRequest) -> Result<String>;
}
