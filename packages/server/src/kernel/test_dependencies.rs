// Test dependencies - mock implementations for testing
//
// Provides a mock vision service that can be injected into the extractor and
// the router in place of the OpenAI implementation.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{BaseVisionAI, VisionRequest};

// =============================================================================
// Mock Vision AI
// =============================================================================

enum MockReply {
    Text(String),
    Failure(String),
}

#[derive(Clone)]
pub struct MockAI {
    responses: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<VisionRequest>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a raw text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::Text(response.into()));
        self
    }

    /// Add a JSON response to the queue (will be serialized)
    pub fn with_json_response<T: serde::Serialize>(self, data: &T) -> Self {
        let json = serde_json::to_string(data).expect("Failed to serialize mock response");
        self.with_response(json)
    }

    /// Queue a failure, as if the API call itself errored
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockReply::Failure(message.into()));
        self
    }

    /// Get all requests that were sent to the AI
    pub fn calls(&self) -> Vec<VisionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last request sent to the AI
    pub fn last_request(&self) -> Option<VisionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseVisionAI for MockAI {
    async fn generate_structured(&self, request: VisionRequest) -> Result<String> {
        // Record the call
        self.calls.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(anyhow!("MockAI has no queued response"));
        }
        match responses.remove(0) {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(message) => Err(anyhow!(message)),
        }
    }
}
