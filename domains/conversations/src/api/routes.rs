//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{chat, conversations};
use super::middleware::ConversationsState;

/// Tutoring chat flow
fn chat_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/chat/start", post(chat::start_conversation))
        .route("/chat/message", post(chat::send_message))
        .route("/chat/regenerate", post(chat::regenerate_response))
}

/// Thread lookup
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/chat/conversation/{id}", get(conversations::get_conversation))
        .route("/chat/conversations", get(conversations::list_conversations))
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(chat_routes())
        .merge(conversation_routes())
}
