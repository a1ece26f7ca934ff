//! Repository implementations for the Conversations domain
//!
//! Threads are persisted as flat, string-field records in a key-value
//! style store. `ThreadStore` is the raw put/get surface over those
//! records; `ThreadRepository` is the only code that converts between a
//! record and a `ConversationThread`.

pub mod memory;
pub mod postgres;
pub mod threads;

use tutor_common::Result;

pub use memory::InMemoryThreadStore;
pub use postgres::PgThreadStore;
pub use threads::ThreadRepository;

/// Flat persisted form of a conversation thread
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ThreadRecord {
    pub id: String,
    pub student_id: String,
    /// JSON array of subject tags
    pub usmos_json: String,
    /// JSON array holding zero or one content id
    pub content_ids: String,
    /// JSON array of message mappings
    pub messages: String,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

/// Primary-key storage for thread records
#[async_trait::async_trait]
pub trait ThreadStore: Send + Sync {
    /// Write a record, fully replacing any record with the same id
    async fn put(&self, record: &ThreadRecord) -> Result<()>;

    /// Fetch a record by id
    async fn get(&self, id: &str) -> Result<Option<ThreadRecord>>;

    /// Active records for a student, oldest first
    async fn list_by_student(&self, student_id: &str) -> Result<Vec<ThreadRecord>>;
}
