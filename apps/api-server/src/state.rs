//! Application state - shared across all handlers.

use std::sync::Arc;

use crosspost_core::ports::{PostRepository, PublicationLogRepository, UserRepository};
use crosspost_core::publish::PostPublisher;
use crosspost_infra::{
    InMemoryPostRepository, InMemoryPublicationLogRepository, InMemoryUserRepository,
};

use crate::config::AppConfig;

/// Shared application state. The publication log repository lives inside the
/// publisher; nothing else writes to the log.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub publisher: PostPublisher,
    pub cron_secret: Option<String>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts, logs) = Self::build_repositories(config).await;
        let publisher = PostPublisher::new(posts.clone(), logs);

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            publisher,
            cron_secret: config.cron_secret.clone(),
        }
    }

    #[cfg(feature = "postgres")]
    async fn build_repositories(
        config: &AppConfig,
    ) -> (
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
        Arc<dyn PublicationLogRepository>,
    ) {
        use crosspost_infra::{
            PostgresPostRepository, PostgresPublicationLogRepository, PostgresUserRepository,
            connect,
        };

        if let Some(db_config) = &config.database {
            match connect(db_config).await {
                Ok(conn) => {
                    return (
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn.clone())),
                        Arc::new(PostgresPublicationLogRepository::new(conn)),
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory_repositories()
    }

    #[cfg(not(feature = "postgres"))]
    async fn build_repositories(
        _config: &AppConfig,
    ) -> (
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
        Arc<dyn PublicationLogRepository>,
    ) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::in_memory_repositories()
    }

    fn in_memory_repositories() -> (
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
        Arc<dyn PublicationLogRepository>,
    ) {
        (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryPublicationLogRepository::new()),
        )
    }

    /// State backed entirely by in-memory repositories, for tests.
    #[cfg(test)]
    pub fn for_tests(cron_secret: Option<String>) -> Self {
        let (users, posts, logs) = Self::in_memory_repositories();
        let publisher = PostPublisher::new(posts.clone(), logs);
        Self {
            users,
            posts,
            publisher,
            cron_secret,
        }
    }
}
