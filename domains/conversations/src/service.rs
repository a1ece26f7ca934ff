//! Conversation orchestration
//!
//! `ConversationService` ties together the thread repository, the content
//! collaborator and the response generator. It holds no per-thread state:
//! every operation loads the thread, changes it, and saves it back whole.

use std::sync::Arc;

use serde::Serialize;
use tutor_common::{Error, Result};
use tutor_content::{ContentError, ContentItem, ContentService};

use crate::domain::entities::{
    ConversationThread, Message, StudentAction, StudentMessage, TutorMessage,
};
use crate::repository::ThreadRepository;
use crate::tutor::ResponseGenerator;

/// Threads created by `start_conversation`, parallel to the content they cover
#[derive(Debug, Clone, Serialize)]
pub struct StartedConversation {
    pub threads: Vec<ConversationThread>,
    pub contents: Vec<ContentItem>,
}

#[derive(Clone)]
pub struct ConversationService {
    threads: ThreadRepository,
    content: Arc<dyn ContentService>,
    tutor: Arc<dyn ResponseGenerator>,
}

fn upstream(e: ContentError) -> Error {
    Error::Upstream(format!("Content service error: {}", e))
}

impl ConversationService {
    pub fn new(
        threads: ThreadRepository,
        content: Arc<dyn ContentService>,
        tutor: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            threads,
            content,
            tutor,
        }
    }

    /// Create one empty thread per content item matching `usmos`
    pub async fn start_conversation(
        &self,
        student_id: &str,
        usmos: &[String],
    ) -> Result<StartedConversation> {
        let contents = self
            .content
            .get_content_by_tags(usmos)
            .await
            .map_err(upstream)?;

        if contents.is_empty() {
            tracing::info!(student_id, ?usmos, "No content found for subject tags");
            return Ok(StartedConversation {
                threads: Vec::new(),
                contents,
            });
        }

        let mut threads = Vec::with_capacity(contents.len());
        for content in &contents {
            let thread = ConversationThread::new(
                student_id,
                content.usmos.clone(),
                content.content_id.as_str(),
            );
            self.threads.save(&thread).await?;
            threads.push(thread);
        }

        tracing::info!(student_id, count = threads.len(), "Conversations started");
        Ok(StartedConversation { threads, contents })
    }

    /// Fetch a thread. Missing and unreadable threads both come back as `None`.
    pub async fn get_thread(&self, thread_id: &str) -> Option<ConversationThread> {
        match self.threads.load(thread_id).await {
            Ok(thread) => thread,
            Err(e) => {
                tracing::error!(thread_id, error = %e, "Failed to load thread");
                None
            }
        }
    }

    /// Active threads of a student, oldest first
    pub async fn list_threads(&self, student_id: &str) -> Result<Vec<ConversationThread>> {
        self.threads.list_by_student(student_id).await
    }

    /// Append a message to its thread and persist the result
    pub async fn add_message(&self, message: impl Into<Message>) -> Result<ConversationThread> {
        let message = message.into();
        let mut thread = self.require_thread(message.conversation_id()).await?;
        thread.push(message);
        self.threads.save(&thread).await?;
        Ok(thread)
    }

    /// Record a student message and produce the tutor's answer to it
    pub async fn handle_student_action(&self, message: StudentMessage) -> Result<TutorMessage> {
        let thread = self.require_thread(&message.conversation_id).await?;
        let content = self.require_content(&thread).await?;

        let action = message.action;
        let thread = self.add_message(message).await?;

        if action == StudentAction::Regenerate {
            return self.regenerate_tutor_response(&thread.id).await;
        }

        self.reply(&thread, &content).await
    }

    /// Replace the trailing tutor reply, if any, with a freshly generated one
    pub async fn regenerate_tutor_response(&self, thread_id: &str) -> Result<TutorMessage> {
        let mut thread = self.require_thread(thread_id).await?;
        let content = self.require_content(&thread).await?;

        if thread.pop_trailing_tutor().is_some() {
            self.threads.save(&thread).await?;
            tracing::debug!(thread_id, "Discarded previous tutor reply");
        }

        self.reply(&thread, &content).await
    }

    async fn reply(
        &self,
        thread: &ConversationThread,
        content: &ContentItem,
    ) -> Result<TutorMessage> {
        let reply = self.tutor.generate(thread, content).await;
        let message = TutorMessage::new(thread.id.as_str(), reply.content, reply.feedback);
        self.add_message(message.clone()).await?;
        Ok(message)
    }

    /// Load a thread, treating an unreadable record as missing
    async fn require_thread(&self, thread_id: &str) -> Result<ConversationThread> {
        match self.threads.load(thread_id).await {
            Ok(Some(thread)) => Ok(thread),
            Ok(None) => Err(Error::NotFound(format!("Thread {} not found", thread_id))),
            Err(Error::CorruptRecord(detail)) => {
                tracing::error!(thread_id, %detail, "Stored thread is corrupt");
                Err(Error::NotFound(format!("Thread {} not found", thread_id)))
            }
            Err(e) => Err(e),
        }
    }

    async fn require_content(&self, thread: &ConversationThread) -> Result<ContentItem> {
        let content_id = thread.content_id.as_deref().ok_or_else(|| {
            Error::NotFound(format!("Thread {} has no content reference", thread.id))
        })?;

        self.content
            .get_content_by_id(content_id)
            .await
            .map_err(upstream)?
            .ok_or_else(|| Error::NotFound(format!("Content {} not found", content_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryThreadStore, ThreadRecord, ThreadStore};
    use crate::tutor::{FixedFeedbackScorer, TemplateResponseGenerator};
    use std::collections::HashMap;
    use tutor_content::mock::MockContentService;

    struct Harness {
        store: InMemoryThreadStore,
        service: ConversationService,
    }

    fn harness_with(content: MockContentService) -> Harness {
        let store = InMemoryThreadStore::new();
        let service = ConversationService::new(
            ThreadRepository::new(Arc::new(store.clone())),
            Arc::new(content),
            Arc::new(TemplateResponseGenerator::new(Arc::new(FixedFeedbackScorer))),
        );
        Harness { store, service }
    }

    fn harness() -> Harness {
        harness_with(MockContentService::new())
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    async fn started_thread(h: &Harness) -> ConversationThread {
        let started = h
            .service
            .start_conversation("student123", &tags(&["MATH.ALG.1"]))
            .await
            .unwrap();
        started.threads.into_iter().next().unwrap()
    }

    fn student(thread_id: &str, text: &str, action: &str) -> StudentMessage {
        StudentMessage::new(thread_id, text, action).unwrap()
    }

    struct FailingContent;

    #[async_trait::async_trait]
    impl ContentService for FailingContent {
        async fn get_content_by_tags(
            &self,
            _tags: &[String],
        ) -> std::result::Result<Vec<ContentItem>, ContentError> {
            Err(ContentError::Request("connection refused".to_string()))
        }

        async fn get_content_by_id(
            &self,
            _content_id: &str,
        ) -> std::result::Result<Option<ContentItem>, ContentError> {
            Err(ContentError::Request("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_start_creates_one_thread_per_content() {
        let h = harness();
        let started = h
            .service
            .start_conversation("student123", &tags(&["MATH.ALG.2", "MATH.ALG.1"]))
            .await
            .unwrap();

        assert_eq!(started.threads.len(), 2);
        assert_eq!(started.contents.len(), 2);
        for (thread, content) in started.threads.iter().zip(&started.contents) {
            assert_eq!(thread.student_id, "student123");
            assert_eq!(thread.content_id.as_deref(), Some(content.content_id.as_str()));
            assert_eq!(thread.usmos, content.usmos);
            assert!(thread.messages.is_empty());
        }
        assert_eq!(started.contents[0].content_id, "content456");
        assert_eq!(h.store.len(), 2);
    }

    #[tokio::test]
    async fn test_start_without_content_persists_nothing() {
        let h = harness();
        let started = h
            .service
            .start_conversation("student123", &tags(&["HISTORY.1"]))
            .await
            .unwrap();

        assert!(started.threads.is_empty());
        assert!(started.contents.is_empty());
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_start_content_failure_is_upstream_error() {
        let store = InMemoryThreadStore::new();
        let service = ConversationService::new(
            ThreadRepository::new(Arc::new(store)),
            Arc::new(FailingContent),
            Arc::new(TemplateResponseGenerator::new(Arc::new(FixedFeedbackScorer))),
        );

        let result = service
            .start_conversation("student123", &tags(&["MATH.ALG.1"]))
            .await;
        assert!(matches!(result, Err(Error::Upstream(_))));
    }

    #[tokio::test]
    async fn test_get_thread_missing_is_none() {
        let h = harness();
        assert!(h.service.get_thread("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_get_thread_corrupt_is_none() {
        let h = harness();
        let thread = started_thread(&h).await;

        let mut record: ThreadRecord = h.store.get(&thread.id).await.unwrap().unwrap();
        record.messages = "{not json".to_string();
        h.store.put(&record).await.unwrap();

        assert!(h.service.get_thread(&thread.id).await.is_none());
        let result = h
            .service
            .handle_student_action(student(&thread.id, "hi", "chat"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_message_appends_in_order() {
        let h = harness();
        let thread = started_thread(&h).await;

        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            let updated = h
                .service
                .add_message(student(&thread.id, text, "chat"))
                .await
                .unwrap();
            assert_eq!(updated.messages.len(), i + 1);
            assert!(updated.updated_at >= thread.updated_at);
        }

        let tutor = TutorMessage::new(thread.id.as_str(), "four", HashMap::new());
        let updated = h.service.add_message(tutor).await.unwrap();
        let texts: Vec<&str> = updated.messages.iter().map(|m| m.content()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four"]);

        let stored = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_add_message_unknown_thread_not_found() {
        let h = harness();
        let result = h.service.add_message(student("missing", "hi", "chat")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_question_gets_templated_answer() {
        let h = harness();
        let thread = started_thread(&h).await;

        let reply = h
            .service
            .handle_student_action(student(&thread.id, "How do I solve this?", "question"))
            .await
            .unwrap();

        assert!(reply.content.contains("Solve for x: x + 5 = 10"));
        assert!(reply.content.contains("x = 5"));
        assert_eq!(reply.conversation_id, thread.id);
        assert_eq!(reply.feedback.len(), 3);

        let stored = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(stored.messages.len(), 2);
        assert!(!stored.messages[0].is_tutor());
        assert_eq!(stored.messages[1], Message::Tutor(reply));
    }

    #[tokio::test]
    async fn test_student_action_unknown_thread_not_found() {
        let h = harness();
        let result = h
            .service
            .handle_student_action(student("missing", "hi", "question"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_student_action_missing_content_not_found() {
        let h = harness_with(MockContentService::empty());
        let thread = ConversationThread::new("student123", tags(&["MATH.ALG.1"]), "content123");
        ThreadRepository::new(Arc::new(h.store.clone()))
            .save(&thread)
            .await
            .unwrap();

        let result = h
            .service
            .handle_student_action(student(&thread.id, "hi", "chat"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let stored = h.service.get_thread(&thread.id).await.unwrap();
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_replaces_trailing_tutor_reply() {
        let h = harness();
        let thread = started_thread(&h).await;
        h.service
            .handle_student_action(student(&thread.id, "x = 15", "answer"))
            .await
            .unwrap();
        let before = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(before.messages.len(), 2);

        let reply = h
            .service
            .regenerate_tutor_response(&thread.id)
            .await
            .unwrap();

        let after = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(after.messages.len(), 2);
        assert_eq!(after.messages[0], before.messages[0]);
        assert_eq!(after.messages[1], Message::Tutor(reply));
    }

    #[tokio::test]
    async fn test_regenerate_after_student_message_only_appends() {
        let h = harness();
        let thread = started_thread(&h).await;
        h.service
            .add_message(student(&thread.id, "hmm", "chat"))
            .await
            .unwrap();

        h.service
            .regenerate_tutor_response(&thread.id)
            .await
            .unwrap();

        let after = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(after.messages.len(), 2);
        assert!(after.messages[1].is_tutor());
    }

    #[tokio::test]
    async fn test_regenerate_on_empty_thread_introduces_problem() {
        let h = harness();
        let thread = started_thread(&h).await;

        let reply = h
            .service
            .regenerate_tutor_response(&thread.id)
            .await
            .unwrap();

        assert!(reply.content.starts_with("Let's discuss this problem:"));
        let after = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(after.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_action_keeps_previous_reply() {
        let h = harness();
        let thread = started_thread(&h).await;
        h.service
            .handle_student_action(student(&thread.id, "what?", "question"))
            .await
            .unwrap();

        let reply = h
            .service
            .handle_student_action(student(&thread.id, "again please", "regenerate"))
            .await
            .unwrap();

        assert!(reply
            .content
            .starts_with("Let me try to explain this differently."));
        let after = h.service.get_thread(&thread.id).await.unwrap();
        assert_eq!(after.messages.len(), 4);
        assert!(after.messages[1].is_tutor());
        assert_eq!(after.messages[2].content(), "again please");
        assert_eq!(after.messages[3], Message::Tutor(reply));
    }

    #[tokio::test]
    async fn test_list_threads_for_student() {
        let h = harness();
        h.service
            .start_conversation("student123", &tags(&["MATH.ALG.1", "MATH.ALG.2"]))
            .await
            .unwrap();
        h.service
            .start_conversation("someone-else", &tags(&["MATH.ALG.1"]))
            .await
            .unwrap();

        let threads = h.service.list_threads("student123").await.unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|t| t.student_id == "student123"));
    }
}
