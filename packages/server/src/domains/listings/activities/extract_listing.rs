//! Extract a book listing from two cover photos

use std::sync::Arc;

use openai_client::StructuredOutput;
use thiserror::Error;
use tracing::{info, warn};

use crate::common::image::UploadedImage;
use crate::domains::listings::models::{BookListing, ListingValidationError};
use crate::kernel::{BaseVisionAI, VisionRequest};

pub const LISTING_SYSTEM_PROMPT: &str = "You are an assistant that analyzes book cover images to create attractive listings. Extract the title, create a selling description, and assess the condition.";

/// Single failure kind surfaced to the controller. The cause is kept.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to process the images or validate the output: {0:#}")]
    Request(#[source] anyhow::Error),

    #[error("Failed to process the images or validate the output: {0}")]
    SchemaViolation(#[source] ListingValidationError),
}

#[derive(Clone)]
pub struct ListingExtractor {
    ai: Arc<dyn BaseVisionAI>,
}

impl ListingExtractor {
    pub fn new(ai: Arc<dyn BaseVisionAI>) -> Self {
        Self { ai }
    }

    /// One request, no retry. Front cover is attached first.
    pub async fn extract(
        &self,
        front: &UploadedImage,
        back: &UploadedImage,
    ) -> Result<BookListing, ExtractionError> {
        let request = VisionRequest {
            system_prompt: LISTING_SYSTEM_PROMPT.to_string(),
            images: vec![front.encode(), back.encode()],
            schema_name: BookListing::type_name(),
            schema: BookListing::openai_schema(),
        };

        let raw = self
            .ai
            .generate_structured(request)
            .await
            .map_err(ExtractionError::Request)?;

        let listing = BookListing::from_json(&raw).map_err(|e| {
            warn!(error = %e, response_length = raw.len(), "Rejected non-conforming listing");
            ExtractionError::SchemaViolation(e)
        })?;

        info!(
            title = %listing.title,
            condition = %listing.condition,
            "Extracted book listing"
        );

        Ok(listing)
    }
}
