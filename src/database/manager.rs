use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{redact_url, DatabaseConfig};

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection setup for the PostgreSQL store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for `config.url` and bring the schema up to date
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        info!(
            url = %redact_url(url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        Self::run_migrations(&pool).await?;
        Ok(pool)
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations completed");
        Ok(())
    }
}
