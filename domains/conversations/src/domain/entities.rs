//! Domain entities for the Conversations domain
//!
//! A conversation thread pairs one student with one piece of content and
//! keeps the ordered log of what the student and the tutor said.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tutor_common::{Error, Result};

/// What the student is doing with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentAction {
    Question,
    Answer,
    Chat,
    Regenerate,
}

impl std::fmt::Display for StudentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentAction::Question => write!(f, "question"),
            StudentAction::Answer => write!(f, "answer"),
            StudentAction::Chat => write!(f, "chat"),
            StudentAction::Regenerate => write!(f, "regenerate"),
        }
    }
}

impl std::str::FromStr for StudentAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "question" => Ok(StudentAction::Question),
            "answer" => Ok(StudentAction::Answer),
            "chat" => Ok(StudentAction::Chat),
            "regenerate" => Ok(StudentAction::Regenerate),
            other => Err(Error::Validation(format!(
                "Unknown action '{}': expected one of question, answer, chat, regenerate",
                other
            ))),
        }
    }
}

/// Message written by the student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StudentMessage {
    #[validate(length(min = 1, message = "conversation_id is required"))]
    pub conversation_id: String,
    pub content: String,
    pub action: StudentAction,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl StudentMessage {
    /// Create a student message, rejecting unknown actions
    pub fn new(
        conversation_id: impl Into<String>,
        content: impl Into<String>,
        action: &str,
    ) -> Result<Self> {
        Ok(Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            action: action.parse()?,
            timestamp: Utc::now(),
        })
    }
}

/// Message produced by the tutor, with quality scores for the reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorMessage {
    pub conversation_id: String,
    pub content: String,
    #[serde(default)]
    pub feedback: HashMap<String, f64>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TutorMessage {
    pub fn new(
        conversation_id: impl Into<String>,
        content: impl Into<String>,
        feedback: HashMap<String, f64>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            feedback,
            timestamp: Utc::now(),
        }
    }
}

/// Either kind of message in a thread's history.
///
/// Serialized without a tag: a student message is recognised by its
/// `action` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Student(StudentMessage),
    Tutor(TutorMessage),
}

impl Message {
    pub fn conversation_id(&self) -> &str {
        match self {
            Message::Student(m) => &m.conversation_id,
            Message::Tutor(m) => &m.conversation_id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Student(m) => &m.content,
            Message::Tutor(m) => &m.content,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Message::Student(m) => m.timestamp,
            Message::Tutor(m) => m.timestamp,
        }
    }

    pub fn is_tutor(&self) -> bool {
        matches!(self, Message::Tutor(_))
    }
}

impl From<StudentMessage> for Message {
    fn from(m: StudentMessage) -> Self {
        Message::Student(m)
    }
}

impl From<TutorMessage> for Message {
    fn from(m: TutorMessage) -> Self {
        Message::Tutor(m)
    }
}

/// Conversation thread entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub id: String,
    pub student_id: String,
    pub usmos: Vec<String>,
    pub content_id: Option<String>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationThread {
    /// Create an empty thread about one content item
    pub fn new(
        student_id: impl Into<String>,
        usmos: Vec<String>,
        content_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.into(),
            usmos,
            content_id: Some(content_id.into()),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the tail of the history
    pub fn push(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
        self.updated_at = Utc::now();
    }

    /// Most recent message written by the student
    pub fn last_student_message(&self) -> Option<&StudentMessage> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Student(s) => Some(s),
            Message::Tutor(_) => None,
        })
    }

    /// Drop the final message if, and only if, the tutor wrote it
    pub fn pop_trailing_tutor(&mut self) -> Option<TutorMessage> {
        match self.messages.last() {
            Some(Message::Tutor(_)) => match self.messages.pop() {
                Some(Message::Tutor(t)) => Some(t),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Subject tags a student wants to practise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UsmosRequest {
    #[validate(length(min = 1, message = "usmos list cannot be empty"))]
    pub usmos: Vec<String>,
}

impl UsmosRequest {
    pub fn new(usmos: Vec<String>) -> Result<Self> {
        let request = Self { usmos };
        request.validate()?;
        Ok(request)
    }
}
