//! Tutor chat application composition root
//!
//! Builds the thread store, the content and model collaborators, and
//! composes the domain router with the infrastructure routes.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tutor_common::{db, Config, StoreProvider};
use tutor_content::{ContentConfig, ContentServiceFactory};
use tutor_conversations::{
    ConversationService, ConversationsState, InMemoryThreadStore, PgThreadStore,
    ResponseGeneratorFactory, ThreadRepository, ThreadStore,
};
use tutor_llm::LlmConfig;

/// Router plus the store pool that must be closed on shutdown
pub struct Application {
    pub router: Router,
    pub pool: Option<PgPool>,
}

/// Open the configured thread store
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn ThreadStore>, Option<PgPool>)> {
    match config.store_provider {
        StoreProvider::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let pool = db::connect(url, config.database_max_connections).await?;
            db::migrate(&pool).await?;
            tracing::info!("Using postgres thread store");
            Ok((Arc::new(PgThreadStore::new(pool.clone())), Some(pool)))
        }
        StoreProvider::Memory => {
            tracing::warn!("Using in-memory thread store, threads are lost on restart");
            Ok((Arc::new(InMemoryThreadStore::new()), None))
        }
    }
}

/// Create the main application with all collaborators wired from the environment
pub async fn create_app(config: &Config) -> anyhow::Result<Application> {
    let (store, pool) = open_store(config).await?;

    let content = ContentServiceFactory::create(ContentConfig::from_env()?)?;
    let tutor = ResponseGeneratorFactory::create(&LlmConfig::from_env()?)?;

    let service = ConversationService::new(ThreadRepository::new(store), Arc::from(content), tutor);

    Ok(Application {
        router: build_router(service),
        pool,
    })
}

/// Compose the domain routes with the infrastructure routes
pub fn build_router(service: ConversationService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(tutor_conversations::routes().with_state(ConversationsState::new(service)))
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the AI Tutor API" }))
}
