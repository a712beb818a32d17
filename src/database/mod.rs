use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily created, cached connection pool for the portal database.
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: RwLock::new(None),
        })
    }

    /// Get the shared pool, creating it from DATABASE_URL on first use.
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let connection_string = Self::connection_string()?;
        let database = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.connect_timeout_secs))
            .connect_lazy(&connection_string)?;

        {
            let mut cached = manager.pool.write().await;
            if let Some(existing) = cached.as_ref() {
                return Ok(existing.clone());
            }
            *cached = Some(pool.clone());
        }

        info!("Created portal database pool");
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
        url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        Ok(base)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Create the areas table when it is missing. Only called when the
    /// bootstrap_schema config flag is on.
    pub async fn ensure_schema() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS areas (name TEXT PRIMARY KEY, links JSONB)")
            .execute(&pool)
            .await?;
        info!("Ensured areas table exists");
        Ok(())
    }

    /// Close and drop the cached pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        let mut cached = manager.pool.write().await;
        if let Some(pool) = cached.take() {
            pool.close().await;
            info!("Closed portal database pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_requires_database_url() {
        // Only observe; other tests must not depend on DATABASE_URL being set
        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                assert_eq!(DatabaseManager::connection_string().unwrap(), url);
            }
            Err(_) => {
                assert!(matches!(
                    DatabaseManager::connection_string(),
                    Err(DatabaseError::ConfigMissing("DATABASE_URL"))
                ));
            }
        }
    }
}
