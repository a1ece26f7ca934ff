//! Store connection setup
//!
//! The pool is opened once at process start and handed to whichever
//! repositories need it. A failed connection is reported immediately and
//! never retried.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::{Error, Result};

/// How long to wait for the first connection before giving up
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the shared connection pool and verify the store is reachable
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|e| Error::Connection(format!("Failed to connect to store: {}", e)))?;

    tracing::info!(max_connections, "Store connection pool established");
    Ok(pool)
}

/// Apply pending schema migrations
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Connection(format!("Failed to apply migrations: {}", e)))?;

    tracing::info!("Store migrations applied");
    Ok(())
}

/// Close the pool, waiting for in-flight queries to finish
pub async fn close(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Store connection pool closed");
}
