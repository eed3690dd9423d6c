//! Server Configuration
//!
//! This module handles loading of server configuration and the database
//! connection. Configuration is loaded from environment variables, with
//! sensible defaults for local development.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::backend::messaging::schema::init_schema;

/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL (`DATABASE_URL`)
    pub database_url: String,
    /// Listen port (`SERVER_PORT`)
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:servilink.db".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        Self { database_url, port }
    }
}

/// Connect to the database and bootstrap the schema.
///
/// An in-memory URL is pinned to a single connection so every pool
/// checkout sees the same database.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("connecting to database");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    tracing::info!("database schema ready");

    Ok(pool)
}
