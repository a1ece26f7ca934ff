//! Shared harness for router-level tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use serde_json::Value;
use tutor_content::mock::MockContentService;
use tutor_conversations::{
    ConversationService, ConversationThread, FixedFeedbackScorer, InMemoryThreadStore,
    TemplateResponseGenerator, ThreadRepository,
};

/// Application wired against in-process collaborators
pub struct TestApp {
    pub store: InMemoryThreadStore,
    pub service: ConversationService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_content(MockContentService::new())
    }

    pub fn with_content(content: MockContentService) -> Self {
        let store = InMemoryThreadStore::new();
        let service = ConversationService::new(
            ThreadRepository::new(Arc::new(store.clone())),
            Arc::new(content),
            Arc::new(TemplateResponseGenerator::new(Arc::new(FixedFeedbackScorer))),
        );
        Self { store, service }
    }

    pub fn router(&self) -> Router {
        tutor_app::build_router(self.service.clone())
    }

    /// Start conversations for `usmos` and return the first thread
    pub async fn start_thread(&self, student_id: &str, usmos: &[&str]) -> ConversationThread {
        let usmos: Vec<String> = usmos.iter().map(|t| t.to_string()).collect();
        self.service
            .start_conversation(student_id, &usmos)
            .await
            .unwrap()
            .threads
            .into_iter()
            .next()
            .unwrap()
    }
}

/// Build a request, with a JSON body when one is given
pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
