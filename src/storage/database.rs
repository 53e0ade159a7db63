//! Storage connector
//!
//! Picks the backend from the connection string, opens it, and creates the schema.
//! The resulting `Database` handle is built once at startup and passed down
//! explicitly; there is no process-wide engine.

use crate::config::normalize_postgres_url;
use crate::storage::{postgres::PostgresItemStore, sqlite::SqliteItemStore};
use anyhow::Result;

/// Which relational engine a connection string points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    /// Detect the backend from the URL scheme
    ///
    /// Accepts `postgresql://`, the legacy `postgres://`, and any `sqlite:` URL.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            let scheme = url.split("://").next().unwrap_or(url);
            Err(anyhow::anyhow!("Unsupported database URL scheme '{}'", scheme))
        }
    }
}

/// Opened relational store
#[derive(Debug, Clone)]
pub enum Database {
    Sqlite(SqliteItemStore),
    Postgres(PostgresItemStore),
}

impl Database {
    /// Open the store behind `url`
    ///
    /// Unreachable stores are fatal to the caller; nothing is retried.
    pub async fn connect(url: &str) -> Result<Self> {
        match Backend::from_url(url)? {
            Backend::Sqlite => {
                tracing::info!("🗄️ Opening SQLite database: {}", url);
                Ok(Self::Sqlite(SqliteItemStore::connect(url).await?))
            }
            Backend::Postgres => {
                tracing::info!("🗄️ Connecting to PostgreSQL");
                let url = normalize_postgres_url(url);
                Ok(Self::Postgres(PostgresItemStore::connect(&url).await?))
            }
        }
    }

    /// Backend in use
    pub fn backend(&self) -> Backend {
        match self {
            Self::Sqlite(_) => Backend::Sqlite,
            Self::Postgres(_) => Backend::Postgres,
        }
    }

    /// Create the work_items table if it doesn't exist yet
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn ensure_schema(&self) -> Result<()> {
        match self {
            Self::Sqlite(store) => store.ensure_schema().await,
            Self::Postgres(store) => store.ensure_schema().await,
        }
    }
}
