//! PostgreSQL backing store for the Limitless back-office

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod models;
pub mod queries;

pub use models::{AdminSessionDb, AnalyticsEventDb, EntityRow};
pub use queries::{AnalyticsQueries, EntityFilter, EntityQueries, LeadQueries, SessionQueries};

pub use sqlx::PgPool;

use limitless_core::{Config, Error, Result};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Handle on the back-office database
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and establish its first connection
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the server cannot be reached.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = pool_options(config)
            .connect(&config.database.url)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Pool that opens connections on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the database URL cannot be parsed.
    pub fn connect_lazy(config: &Config) -> Result<Self> {
        let pool = pool_options(config)
            .connect_lazy(&config.database.url)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if a migration cannot be applied.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("migration failed: {e}")))?;

        Ok(())
    }

    /// Ping the server
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the ping fails.
    pub async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout))
}

/// Round-trip a trivial query through `pool`
///
/// # Errors
///
/// Returns [`Error::Database`] if no connection answers.
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| Error::Database(format!("ping failed: {e}")))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use limitless_core::config::DatabaseConfig;

    fn unreachable_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgresql://127.0.0.1:1/limitless".to_string(),
                max_connections: 2,
                min_connections: 0,
                connect_timeout: 1,
                idle_timeout: 60,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_rejects_unknown_scheme() {
        let mut config = unreachable_config();
        config.database.url = "invalid://url".to_string();

        let err = Database::new(&config).await.unwrap_err();
        assert!(matches!(err, Error::Database(ref msg) if !msg.is_empty()));
    }

    #[tokio::test]
    async fn test_connect_lazy_rejects_unparseable_url() {
        let mut config = unreachable_config();
        config.database.url = "not a url".to_string();

        assert!(Database::connect_lazy(&config).is_err());
    }

    #[tokio::test]
    async fn test_ping_of_unreachable_server_fails() {
        let db = Database::connect_lazy(&unreachable_config()).unwrap();

        let err = db.health_check().await.unwrap_err();
        assert!(matches!(err, Error::Database(ref msg) if msg.starts_with("ping failed")));
    }

    #[tokio::test]
    async fn test_migrations_need_a_reachable_server() {
        let db = Database::connect_lazy(&unreachable_config()).unwrap();

        let err = db.migrate().await.unwrap_err();
        assert!(matches!(err, Error::Database(ref msg) if msg.starts_with("migration failed")));
    }
}
