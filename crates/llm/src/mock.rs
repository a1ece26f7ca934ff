//! Mock LLM Service Implementation
//!
//! Returns deterministic replies and records every request for test
//! assertions. Can be switched into a failing mode to exercise fallbacks.
//! Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmRole, LlmService};

pub const DEFAULT_MODEL: &str = "mock-model";

/// Mock LLM service for testing
#[derive(Debug, Clone)]
pub struct MockLlmService {
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    fail: bool,
}

impl MockLlmService {
    /// Create a mock that always answers
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Create a mock whose every completion fails with a request error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Return all recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::debug!(turns = request.messages.len(), "Mock LLM: recording request");

        self.requests
            .lock()
            .map_err(|e| LlmError::Request(format!("requests lock poisoned: {e}")))?
            .push(request.clone());

        if self.fail {
            return Err(LlmError::Request("mock provider configured to fail".to_string()));
        }

        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == LlmRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("nothing yet");

        let content = format!("Mock tutor reply to: {}", last_user);
        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model: if request.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                request.model
            },
            input_tokens,
            output_tokens,
            stop_reason: "end_turn".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }
}
