//! Chat flow handlers: start, message, regenerate

use axum::{extract::State, Json};
use serde::Deserialize;
use tutor_common::{Result, ValidatedJson, ValidatedQuery};
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{StudentMessage, TutorMessage, UsmosRequest};
use crate::service::StartedConversation;

/// `?student_id=` query parameter
#[derive(Debug, Deserialize, Validate)]
pub struct StudentQuery {
    #[validate(length(min = 1, message = "student_id is required"))]
    pub student_id: String,
}

/// Request for regenerating the last tutor reply
#[derive(Debug, Deserialize, Validate)]
pub struct RegenerateRequest {
    #[validate(length(min = 1, message = "conversation_id is required"))]
    pub conversation_id: String,
}

/// Start conversations for every content item matching the subject tags
pub async fn start_conversation(
    State(state): State<ConversationsState>,
    ValidatedQuery(query): ValidatedQuery<StudentQuery>,
    ValidatedJson(req): ValidatedJson<UsmosRequest>,
) -> Result<Json<StartedConversation>> {
    let started = state
        .service
        .start_conversation(&query.student_id, &req.usmos)
        .await?;
    Ok(Json(started))
}

/// Post a student message and return the tutor's reply
pub async fn send_message(
    State(state): State<ConversationsState>,
    ValidatedJson(message): ValidatedJson<StudentMessage>,
) -> Result<Json<TutorMessage>> {
    let reply = state.service.handle_student_action(message).await?;
    Ok(Json(reply))
}

/// Regenerate the most recent tutor reply
pub async fn regenerate_response(
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<RegenerateRequest>,
) -> Result<Json<TutorMessage>> {
    let reply = state
        .service
        .regenerate_tutor_response(&req.conversation_id)
        .await?;
    Ok(Json(reply))
}
