//! In-memory thread store
//!
//! Used by tests and by `STORE_PROVIDER=memory` for local runs. Records
//! live only as long as the process. Thread-safe via `Arc<RwLock<>>`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tutor_common::{Error, Result};

use super::{ThreadRecord, ThreadStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryThreadStore {
    records: Arc<RwLock<HashMap<String, ThreadRecord>>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records. A poisoned lock still reports what it holds.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(err: PoisonError<T>) -> Error {
    Error::Persistence(format!("thread store lock poisoned: {}", err))
}

#[async_trait::async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn put(&self, record: &ThreadRecord) -> Result<()> {
        self.records
            .write()
            .map_err(poisoned)?
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ThreadRecord>> {
        Ok(self.records.read().map_err(poisoned)?.get(id).cloned())
    }

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<ThreadRecord>> {
        let mut records: Vec<ThreadRecord> = self
            .records
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|r| r.student_id == student_id && r.is_active)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}
