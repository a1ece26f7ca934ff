//! Tutor reply generation
//!
//! A `ResponseGenerator` turns a thread plus the content it concerns into
//! the tutor's next reply. Generators never fail: any internal problem is
//! absorbed into a fixed-text reply. The implementation is picked once at
//! startup by `ResponseGeneratorFactory`.

pub mod llm;
pub mod template;

use std::collections::HashMap;
use std::sync::Arc;

use tutor_common::{Error, Result};
use tutor_content::ContentItem;
use tutor_llm::{LlmConfig, LlmServiceFactory};

use crate::domain::entities::ConversationThread;

pub use llm::LlmResponseGenerator;
pub use template::TemplateResponseGenerator;

/// Text and quality scores for one tutor reply
#[derive(Debug, Clone, PartialEq)]
pub struct TutorReply {
    pub content: String,
    pub feedback: HashMap<String, f64>,
}

/// Produces the tutor's next reply for a thread
#[async_trait::async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, thread: &ConversationThread, content: &ContentItem) -> TutorReply;
}

/// Scores a tutor reply
pub trait FeedbackScorer: Send + Sync {
    fn score(&self, reply: &str) -> HashMap<String, f64>;
}

/// Scorer returning the same placeholder scores for every reply
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedFeedbackScorer;

impl FeedbackScorer for FixedFeedbackScorer {
    fn score(&self, _reply: &str) -> HashMap<String, f64> {
        HashMap::from([
            ("clarity".to_string(), 0.9),
            ("helpfulness".to_string(), 0.85),
            ("engagement".to_string(), 0.8),
        ])
    }
}

/// Opening reply used before the student has said anything
pub(crate) fn introduction(content: &ContentItem) -> TutorReply {
    TutorReply {
        content: format!(
            "Let's discuss this problem: {}. How would you approach solving it?",
            content.problem
        ),
        feedback: HashMap::new(),
    }
}

/// Factory for creating ResponseGenerator implementations
pub struct ResponseGeneratorFactory;

impl ResponseGeneratorFactory {
    /// Template replies when no model provider is configured, model-backed otherwise
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn ResponseGenerator>> {
        let scorer = Arc::new(FixedFeedbackScorer);

        if !config.is_enabled() {
            tracing::info!("No LLM provider configured, using template tutor replies");
            return Ok(Arc::new(TemplateResponseGenerator::new(scorer)));
        }

        let llm = LlmServiceFactory::create(config.clone())
            .map_err(|e| Error::Internal(format!("Failed to create LLM service: {}", e)))?;
        tracing::info!(provider = %config.provider, "Using model-backed tutor replies");
        Ok(Arc::new(LlmResponseGenerator::new(Arc::from(llm), scorer)))
    }
}
