//! Conversations domain: tutoring threads, message history, tutor replies

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;
pub mod tutor;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    ConversationThread, Message, StudentAction, StudentMessage, TutorMessage, UsmosRequest,
};

// Re-export repository types
pub use repository::{InMemoryThreadStore, PgThreadStore, ThreadRepository, ThreadStore};

// Re-export service and generator types
pub use service::{ConversationService, StartedConversation};
pub use tutor::{
    FeedbackScorer, FixedFeedbackScorer, LlmResponseGenerator, ResponseGenerator,
    ResponseGeneratorFactory, TemplateResponseGenerator,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
