//! # Database Module
//!
//! Async connection pools with SQLx for PostgreSQL and SQLite.

use crate::error::{Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Default maximum pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Database connection pool supporting multiple backends
#[derive(Clone, Debug)]
pub enum DatabasePool {
    /// SQLite connection pool
    Sqlite(SqlitePool),
    /// PostgreSQL connection pool
    Postgres(PgPool),
}

/// Run the same body against whichever pool is active.
///
/// The body is type-checked once per backend, so a query built with
/// `sqlx::query_as` resolves its row type for each driver.
macro_rules! with_pool {
    ($db:expr, $pool:ident => $body:expr) => {
        match $db {
            $crate::database::DatabasePool::Sqlite($pool) => $body,
            $crate::database::DatabasePool::Postgres($pool) => $body,
        }
    };
}
pub(crate) use with_pool;

impl DatabasePool {
    /// Connect to the backend named by the URL scheme
    ///
    /// `postgres://` and `postgresql://` select PostgreSQL; anything else is
    /// handed to SQLite.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the connection fails.
    pub async fn connect(url: &str, max_connections: Option<u32>) -> Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Self::connect_postgres(url, max_connections).await
        } else {
            Self::connect_sqlite(url, max_connections).await
        }
    }

    /// Connect to a SQLite database
    ///
    /// `sqlite::memory:` gives every connection its own database, so
    /// in-memory pools should be created with `Some(1)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the connection fails.
    pub async fn connect_sqlite(url: &str, max_connections: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .connect(url)
            .await
            .map_err(|e| Error::Database {
                message: format!("SQLite connection failed: {e}"),
            })?;

        Ok(Self::Sqlite(pool))
    }

    /// Connect to a PostgreSQL database
    ///
    /// # Errors
    ///
    /// Returns `Error::Database` if the connection fails.
    pub async fn connect_postgres(url: &str, max_connections: Option<u32>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .connect(url)
            .await
            .map_err(|e| Error::Database {
                message: format!("PostgreSQL connection failed: {e}"),
            })?;

        Ok(Self::Postgres(pool))
    }

    /// Backend name for logging
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        with_pool!(self, pool => pool.close().await);
    }
}
