//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use openai_client::OpenAIClient;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::listings::ListingExtractor;
use crate::kernel::{BaseVisionAI, OpenAIVision};
use crate::server::routes::{health_handler, index_handler, next_handler, submit_handler};
use crate::server::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub extractor: ListingExtractor,
    pub model: String,
}

impl AppState {
    pub fn new(ai: Arc<dyn BaseVisionAI>, model: impl Into<String>) -> Self {
        Self {
            sessions: SessionStore::new(),
            extractor: ListingExtractor::new(ai),
            model: model.into(),
        }
    }

    /// Wire the OpenAI implementation from configuration
    pub fn from_config(config: &Config) -> Self {
        let mut client = OpenAIClient::new(config.openai_api_key.clone());
        if let Some(base_url) = &config.openai_base_url {
            client = client.with_base_url(base_url.clone());
        }

        let vision = OpenAIVision::new(client, config.openai_model.clone());
        Self::new(Arc::new(vision), config.openai_model.clone())
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/submit", post(submit_handler))
        .route("/next", post(next_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
