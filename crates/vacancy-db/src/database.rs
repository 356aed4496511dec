use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use vacancy_core::AppError;

use crate::config::DatabaseConfig;
use crate::repository::VacancyRepository;

/// Central database facade: owns the connection pool and vends the
/// repository.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a [`VacancyRepository`] backed by this pool.
    pub fn vacancy_repo(&self) -> VacancyRepository {
        VacancyRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection. Idempotent.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
