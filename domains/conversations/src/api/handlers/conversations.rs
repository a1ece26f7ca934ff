//! Thread lookup handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tutor_common::{Error, Result, ValidatedQuery};

use super::chat::StudentQuery;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::ConversationThread;

/// Get a single thread with its full message history
pub async fn get_conversation(
    State(state): State<ConversationsState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationThread>> {
    state
        .service
        .get_thread(&id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))
}

/// List a student's active threads, oldest first
pub async fn list_conversations(
    State(state): State<ConversationsState>,
    ValidatedQuery(query): ValidatedQuery<StudentQuery>,
) -> Result<Json<Vec<ConversationThread>>> {
    let threads = state.service.list_threads(&query.student_id).await?;
    Ok(Json(threads))
}
