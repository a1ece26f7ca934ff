//! Thread repository: encode/decode between `ConversationThread` and
//! its flat `ThreadRecord`.
//!
//! Each persisted message is a JSON object carrying the variant's own
//! fields plus `kind: "student" | "tutor"`. Records written before `kind`
//! existed are still readable: a message whose `action` is present and
//! non-null is a student message, anything else is a tutor message.
//!
//! Saves are full replacements. There is no version check, so two
//! concurrent writers to one thread race and the last save wins.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tutor_common::time::{parse_iso, to_iso};
use tutor_common::{Error, Result};

use super::{ThreadRecord, ThreadStore};
use crate::domain::entities::{ConversationThread, Message, StudentMessage, TutorMessage};

const KIND_FIELD: &str = "kind";
const KIND_STUDENT: &str = "student";
const KIND_TUTOR: &str = "tutor";

/// Borrowed, explicitly tagged view of a message used for encoding
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StoredMessage<'a> {
    Student(&'a StudentMessage),
    Tutor(&'a TutorMessage),
}

impl<'a> From<&'a Message> for StoredMessage<'a> {
    fn from(m: &'a Message) -> Self {
        match m {
            Message::Student(s) => StoredMessage::Student(s),
            Message::Tutor(t) => StoredMessage::Tutor(t),
        }
    }
}

/// Store adapter for conversation threads
#[derive(Clone)]
pub struct ThreadRepository {
    store: Arc<dyn ThreadStore>,
}

impl ThreadRepository {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    /// Persist the whole thread under its id
    pub async fn save(&self, thread: &ConversationThread) -> Result<()> {
        let record = encode_thread(thread)?;
        self.store.put(&record).await?;
        tracing::debug!(
            thread_id = %thread.id,
            messages = thread.messages.len(),
            "Thread saved"
        );
        Ok(())
    }

    /// Load a thread; `Ok(None)` when no record exists
    pub async fn load(&self, thread_id: &str) -> Result<Option<ConversationThread>> {
        match self.store.get(thread_id).await? {
            Some(record) => decode_thread(record).map(Some),
            None => Ok(None),
        }
    }

    /// Active threads for a student, oldest first
    pub async fn list_by_student(&self, student_id: &str) -> Result<Vec<ConversationThread>> {
        self.store
            .list_by_student(student_id)
            .await?
            .into_iter()
            .map(decode_thread)
            .collect()
    }
}

/// Build the persisted record for a thread
pub fn encode_thread(thread: &ConversationThread) -> Result<ThreadRecord> {
    let encode_err = |field: &str, e: serde_json::Error| {
        Error::Persistence(format!(
            "Failed to encode {} of thread {}: {}",
            field, thread.id, e
        ))
    };

    // JSON has no NaN or infinity; serde_json would write them as null
    for message in &thread.messages {
        if let Message::Tutor(tutor) = message {
            if let Some((name, score)) = tutor.feedback.iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::Persistence(format!(
                    "Failed to encode messages of thread {}: feedback '{}' is not finite ({})",
                    thread.id, name, score
                )));
            }
        }
    }

    let messages: Vec<StoredMessage<'_>> = thread.messages.iter().map(Into::into).collect();
    let content_ids: Vec<&str> = thread.content_id.iter().map(String::as_str).collect();

    Ok(ThreadRecord {
        id: thread.id.clone(),
        student_id: thread.student_id.clone(),
        usmos_json: serde_json::to_string(&thread.usmos).map_err(|e| encode_err("usmos", e))?,
        content_ids: serde_json::to_string(&content_ids)
            .map_err(|e| encode_err("content_ids", e))?,
        messages: serde_json::to_string(&messages).map_err(|e| encode_err("messages", e))?,
        created_at: to_iso(&thread.created_at),
        updated_at: to_iso(&thread.updated_at),
        is_active: true,
    })
}

/// Rebuild a thread from its persisted record
pub fn decode_thread(record: ThreadRecord) -> Result<ConversationThread> {
    let id = record.id;
    let corrupt = |what: &str, detail: String| {
        Error::CorruptRecord(format!("thread {}: {}: {}", id, what, detail))
    };

    let usmos: Vec<String> = serde_json::from_str(&record.usmos_json)
        .map_err(|e| corrupt("usmos_json", e.to_string()))?;

    let content_ids: Vec<Option<String>> = serde_json::from_str(&record.content_ids)
        .map_err(|e| corrupt("content_ids", e.to_string()))?;
    let content_id = content_ids.into_iter().next().flatten();

    let raw_messages: Vec<Map<String, Value>> = serde_json::from_str(&record.messages)
        .map_err(|e| corrupt("messages", e.to_string()))?;
    let messages = raw_messages
        .into_iter()
        .enumerate()
        .map(|(i, fields)| decode_message(fields).map_err(|e| corrupt(&format!("message {}", i), e)))
        .collect::<Result<Vec<_>>>()?;

    let created_at =
        parse_iso(&record.created_at).map_err(|e| corrupt("created_at", e.to_string()))?;
    let updated_at =
        parse_iso(&record.updated_at).map_err(|e| corrupt("updated_at", e.to_string()))?;

    Ok(ConversationThread {
        id: id.clone(),
        student_id: record.student_id,
        usmos,
        content_id,
        messages,
        created_at,
        updated_at,
    })
}

/// Recover one message's variant from its stored field mapping
fn decode_message(mut fields: Map<String, Value>) -> std::result::Result<Message, String> {
    let is_student = match fields.remove(KIND_FIELD) {
        Some(Value::String(kind)) => match kind.as_str() {
            KIND_STUDENT => true,
            KIND_TUTOR => false,
            other => return Err(format!("unknown kind '{}'", other)),
        },
        Some(Value::Null) | None => fields.get("action").is_some_and(|a| !a.is_null()),
        Some(other) => return Err(format!("kind must be a string, got {}", other)),
    };

    let value = Value::Object(fields);
    if is_student {
        serde_json::from_value(value)
            .map(Message::Student)
            .map_err(|e| e.to_string())
    } else {
        serde_json::from_value(value)
            .map(Message::Tutor)
            .map_err(|e| e.to_string())
    }
}
