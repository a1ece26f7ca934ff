//! PostgreSQL-backed thread store

use sqlx::PgPool;
use tutor_common::{Error, Result};

use super::{ThreadRecord, ThreadStore};

#[derive(Clone)]
pub struct PgThreadStore {
    pool: PgPool,
}

impl PgThreadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence(op: &str, err: sqlx::Error) -> Error {
    Error::Persistence(format!("{} failed: {}", op, err))
}

#[async_trait::async_trait]
impl ThreadStore for PgThreadStore {
    async fn put(&self, record: &ThreadRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_threads (
                id, student_id, usmos_json, content_ids, messages,
                created_at, updated_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                student_id = EXCLUDED.student_id,
                usmos_json = EXCLUDED.usmos_json,
                content_ids = EXCLUDED.content_ids,
                messages = EXCLUDED.messages,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(&record.id)
        .bind(&record.student_id)
        .bind(&record.usmos_json)
        .bind(&record.content_ids)
        .bind(&record.messages)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .bind(record.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| persistence("Thread write", e))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ThreadRecord>> {
        let record = sqlx::query_as::<_, ThreadRecord>(
            r#"
            SELECT id, student_id, usmos_json, content_ids, messages,
                   created_at, updated_at, is_active
            FROM conversation_threads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| persistence("Thread read", e))?;

        Ok(record)
    }

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<ThreadRecord>> {
        let records = sqlx::query_as::<_, ThreadRecord>(
            r#"
            SELECT id, student_id, usmos_json, content_ids, messages,
                   created_at, updated_at, is_active
            FROM conversation_threads
            WHERE student_id = $1 AND is_active
            ORDER BY created_at ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| persistence("Thread listing", e))?;

        Ok(records)
    }
}
