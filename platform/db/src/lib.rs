//! Database primitives: connection settings and pool bootstrap.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Shared connection pool handle. Cloning is cheap.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing")]
    MissingUrl,
    #[error("unsupported database url scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_URL: &str = "sqlite://payroll-analytics.db?mode=rwc";

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub log_statements: bool,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_connections: default_max_connections(),
            log_statements: false,
        }
    }
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` and `DATABASE_LOG_SQL`.
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_max_connections);
        let log_statements = std::env::var("DATABASE_LOG_SQL")
            .ok()
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            url,
            max_connections,
            log_statements,
        }
    }

    pub fn backend(&self) -> DbResult<DatabaseBackend> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(DbError::MissingUrl);
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseBackend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(DbError::UnsupportedScheme(scheme.to_string()))
        }
    }
}

/// Open a pooled connection and enable foreign keys on SQLite.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let backend = settings.backend()?;
    // every connection to an in-memory SQLite url opens a fresh database
    let max_connections = if settings.url.contains(":memory:") {
        1
    } else {
        settings.max_connections
    };
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(settings.log_statements);
    let pool = Database::connect(options).await?;
    if backend == DatabaseBackend::Sqlite {
        pool.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys = ON;",
        ))
        .await?;
    }
    info!(backend = ?backend, "database connected");
    Ok(pool)
}

/// Round-trip a trivial query; used by health checks.
pub async fn ping(pool: &DbPool) -> bool {
    let backend = pool.get_database_backend();
    pool.execute(Statement::from_string(backend, "SELECT 1"))
        .await
        .is_ok()
}
