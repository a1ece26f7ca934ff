//! Model-backed tutor replies
//!
//! The problem, answer and explanation go into the system prompt; the
//! thread history becomes the user/assistant turns. Model failures are
//! logged and replaced with a short fixed reply.

use std::sync::Arc;

use tutor_content::ContentItem;
use tutor_llm::{CompletionRequest, LlmMessage, LlmService};

use super::{introduction, FeedbackScorer, ResponseGenerator, TutorReply};
use crate::domain::entities::{ConversationThread, Message};

pub struct LlmResponseGenerator {
    llm: Arc<dyn LlmService>,
    scorer: Arc<dyn FeedbackScorer>,
}

impl LlmResponseGenerator {
    pub fn new(llm: Arc<dyn LlmService>, scorer: Arc<dyn FeedbackScorer>) -> Self {
        Self { llm, scorer }
    }
}

fn system_prompt(content: &ContentItem) -> String {
    format!(
        "You are a patient tutor helping a student work through one problem. \
         Guide the student toward understanding rather than just stating the answer, \
         and keep replies short.\n\n\
         Problem: {}\nAnswer: {}\nExplanation: {}",
        content.problem,
        content.answer,
        content.explanation.as_deref().unwrap_or("")
    )
}

/// History as model turns; leading tutor turns are dropped so the
/// conversation opens with the student.
fn history(thread: &ConversationThread) -> Vec<LlmMessage> {
    thread
        .messages
        .iter()
        .skip_while(|m| m.is_tutor())
        .map(|m| match m {
            Message::Student(s) => LlmMessage::user(s.content.as_str()),
            Message::Tutor(t) => LlmMessage::assistant(t.content.as_str()),
        })
        .collect()
}

fn fallback(content: &ContentItem) -> String {
    format!(
        "I understand your question about {}. The answer is {}.",
        content.problem, content.answer
    )
}

#[async_trait::async_trait]
impl ResponseGenerator for LlmResponseGenerator {
    async fn generate(&self, thread: &ConversationThread, content: &ContentItem) -> TutorReply {
        if thread.last_student_message().is_none() {
            return introduction(content);
        }

        let request = CompletionRequest {
            system_prompt: Some(system_prompt(content)),
            messages: history(thread),
            ..Default::default()
        };

        let text = match self.llm.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                tracing::debug!(
                    thread_id = %thread.id,
                    model = %response.model,
                    output_tokens = response.output_tokens,
                    "Tutor reply generated"
                );
                response.content
            }
            Ok(_) => {
                tracing::warn!(thread_id = %thread.id, "Model returned an empty reply, using fallback");
                fallback(content)
            }
            Err(e) => {
                tracing::error!(thread_id = %thread.id, error = %e, "Model call failed, using fallback");
                fallback(content)
            }
        };

        TutorReply {
            feedback: self.scorer.score(&text),
            content: text,
        }
    }
}
