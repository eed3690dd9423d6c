//! Database test fixtures
//!
//! In-memory SQLite builders shared by the integration tests.

use axum::Router;
use sqlx::SqlitePool;

use servilink::backend::server::config::connect_database;
use servilink::backend::server::init::create_app_with_pool;

/// Fresh in-memory database with the schema applied.
pub async fn memory_pool() -> SqlitePool {
    connect_database("sqlite::memory:")
        .await
        .expect("failed to open in-memory database")
}

/// Full application router over a fresh in-memory database.
pub async fn test_app() -> Router {
    create_app_with_pool(memory_pool().await)
}
