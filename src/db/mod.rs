//! Database handle and models
//!
//! The pool is opened once at startup, handed to every request through the
//! application state, and closed after the server shuts down.

pub mod doc;
pub mod folder;

pub use doc::{CreateDocument, Document, UpdateDocument};
pub use folder::{CreateFolder, Folder};

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Process-wide database handle
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `config`, running migrations if enabled
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            "Connecting to database (max_connections={})",
            config.max_connections
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        let db = Self { pool };
        if config.migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// A private in-memory database with migrations applied.
    ///
    /// Every SQLite memory connection is its own database, so the pool holds
    /// exactly one connection and never recycles it.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::debug!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every connection; waits for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
