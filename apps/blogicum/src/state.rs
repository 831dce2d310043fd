//! Application state - shared across all handlers.

use blogicum_core::Blog;
use blogicum_infra::InMemoryStore;

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Blog,
    pub session: SessionConfig,
    /// Backend name reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// A blog backed by a fresh in-memory store.
    pub fn in_memory(session: SessionConfig) -> Self {
        Self {
            blog: Blog::new(InMemoryStore::new().repositories()),
            session,
            storage: "memory",
        }
    }

    /// Build the application state with the configured store.
    ///
    /// A configured but unreachable database fails startup.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
            return Ok(Self::in_memory(config.session.clone()));
        };

        #[cfg(feature = "postgres")]
        let state = {
            let db = blogicum_infra::database::connect(db_config)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    std::io::Error::other(e.to_string())
                })?;

            tracing::info!("Application state initialized on PostgreSQL");
            Self {
                blog: Blog::new(blogicum_infra::PostgresStore::repositories(db)),
                session: config.session.clone(),
                storage: "postgres",
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            tracing::warn!(
                url_set = !db_config.url.is_empty(),
                "Built without the postgres feature - ignoring DATABASE_URL"
            );
            Self::in_memory(config.session.clone())
        };

        Ok(state)
    }
}
