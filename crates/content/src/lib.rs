//! Tutor Content Service
//!
//! Looks up practice problems (problem, answer, explanation) either by the
//! curriculum tags (usmos) they cover or by their content id:
//! - HTTP client for the remote content API
//! - Mock catalog for testing and local development

pub mod client;
pub mod mock;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content configuration error: {0}")]
    Configuration(String),

    #[error("Content request error: {0}")]
    Request(String),

    #[error("Content response error: {0}")]
    Response(String),
}

/// A practice problem the tutor discusses with a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub content_id: String,
    pub usmos: Vec<String>,
    pub problem: String,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Content service configuration
#[derive(Clone)]
pub struct ContentConfig {
    /// Content provider (http, mock)
    pub provider: String,
    /// Root URL of the remote content API
    pub base_url: String,
    /// Optional bearer token for the remote content API
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for ContentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ContentConfig {
    /// Create content config from environment variables
    pub fn from_env() -> Result<Self, ContentError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("CONTENT_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let base_url = std::env::var("CONTENT_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_key = std::env::var("CONTENT_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let timeout_secs = std::env::var("CONTENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            provider,
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Read-only access to learning content
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    /// Content covering any of the given tags; an empty result is not an error
    async fn get_content_by_tags(&self, tags: &[String]) -> Result<Vec<ContentItem>, ContentError>;

    /// A single content item, or `None` when the id is unknown
    async fn get_content_by_id(&self, content_id: &str)
        -> Result<Option<ContentItem>, ContentError>;
}

/// Factory for creating ContentService implementations
pub struct ContentServiceFactory;

impl ContentServiceFactory {
    /// Create a ContentService based on configuration
    pub fn create(config: ContentConfig) -> Result<Box<dyn ContentService>, ContentError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP content service");
                Ok(Box::new(client::HttpContentService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock content service");
                Ok(Box::new(mock::MockContentService::new()))
            }
            provider => Err(ContentError::Configuration(format!(
                "Unknown content provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
