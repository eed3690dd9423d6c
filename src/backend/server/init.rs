//! Server Initialization
//!
//! This module handles the initialization and setup of the Axum HTTP
//! server: database connection and schema bootstrap, state creation, and
//! route configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;

use crate::backend::messaging::notify::MessageBroadcast;
use crate::backend::messaging::service::ConversationService;
use crate::backend::routes::create_router;
use crate::backend::server::config::{connect_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application.
///
/// Connects to the database named by the configuration, bootstraps the
/// schema, wires the conversation service to the notification broadcast,
/// and assembles the router.
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, sqlx::Error> {
    tracing::info!("initializing servilink backend server");

    let pool = connect_database(&config.database_url).await?;
    Ok(create_app_with_pool(pool))
}

/// Assemble the application around an existing pool.
///
/// Used directly by tests that bring their own in-memory database.
pub fn create_app_with_pool(pool: SqlitePool) -> Router<()> {
    let message_broadcast = MessageBroadcast::new();
    let service = Arc::new(ConversationService::new(
        pool,
        Arc::new(message_broadcast.clone()),
    ));

    let app_state = AppState {
        service,
        message_broadcast: message_broadcast.clone(),
    };

    let app = create_router(app_state);

    // Periodic cleanup of broadcast channels nobody subscribes to anymore
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            message_broadcast.cleanup_idle_channels();
            tracing::debug!("cleaned up idle notification channels");
        }
    });

    tracing::info!("router configured");

    app
}
