//! Rule-based tutor replies built from fixed text templates

use std::sync::Arc;

use tutor_content::ContentItem;

use super::{introduction, FeedbackScorer, ResponseGenerator, TutorReply};
use crate::domain::entities::{ConversationThread, StudentAction, StudentMessage};

pub struct TemplateResponseGenerator {
    scorer: Arc<dyn FeedbackScorer>,
}

impl TemplateResponseGenerator {
    pub fn new(scorer: Arc<dyn FeedbackScorer>) -> Self {
        Self { scorer }
    }
}

/// Reply text for the student's latest message
fn template_reply(last: &StudentMessage, content: &ContentItem) -> String {
    match last.action {
        StudentAction::Question => format!(
            "That's a good question about '{}'. The answer is '{}'. Does that make sense?",
            content.problem, content.answer
        ),
        StudentAction::Answer => {
            if last
                .content
                .to_lowercase()
                .contains(&content.answer.to_lowercase())
            {
                "That's correct! Well done.".to_string()
            } else {
                format!(
                    "Not quite. The correct answer is '{}'. Let me explain: {}",
                    content.answer,
                    content
                        .explanation
                        .as_deref()
                        .unwrap_or("Think about it carefully.")
                )
            }
        }
        StudentAction::Chat => format!(
            "I understand your comment. Let's continue discussing this problem: {}",
            content.problem
        ),
        StudentAction::Regenerate => format!(
            "Let me try to explain this differently. The problem is '{}' and the answer is '{}'. {}",
            content.problem,
            content.answer,
            content.explanation.as_deref().unwrap_or("")
        )
        .trim_end()
        .to_string(),
    }
}

#[async_trait::async_trait]
impl ResponseGenerator for TemplateResponseGenerator {
    async fn generate(&self, thread: &ConversationThread, content: &ContentItem) -> TutorReply {
        let Some(last) = thread.last_student_message() else {
            return introduction(content);
        };

        let text = template_reply(last, content);
        TutorReply {
            feedback: self.scorer.score(&text),
            content: text,
        }
    }
}
