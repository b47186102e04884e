//! Scout Database Layer
//!
//! `SQLite` storage for scraped creator profiles, accessed through `SQLx`
//! with embedded, versioned migrations.
//!
//! # Example
//!
//! ```ignore
//! use scout_db::{Database, ProfileStore};
//!
//! let db = Database::new("creator-scout.db").await?;
//! db.run_migrations().await?;
//!
//! db.upsert(&record).await?;
//! let stats = db.stats().await?;
//! ```
//!
//! The [`ProfileStore`] trait is what the rest of the workspace depends on;
//! [`profiles`] exposes the full query surface for tools that need more.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod profiles;
pub mod store;

pub use error::{Result, StoreError};
pub use profiles::StoreStats;
pub use store::ProfileStore;

use std::path::Path;

/// Database handle: a connection pool plus migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open the database at `path` (or [`connection::IN_MEMORY`]).
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::new(connection::IN_MEMORY).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Highest applied migration version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Underlying pool, for the functions in [`profiles`].
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Whether the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                false
            }
        }
    }

    /// Close all connections.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{Platform, ProfileRecord};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_roundtrip_through_trait() {
        let db = Database::in_memory().await.expect("open database");
        assert!(db.health_check().await);

        let handle = Platform::Instagram.parse_handle("chef.sam").expect("handle");
        let url = Platform::Instagram.profile_url(&handle);
        let mut record = ProfileRecord::new(Platform::Instagram, handle, url.clone());
        record.niche = Some("Food".to_string());

        let store: &dyn ProfileStore = &db;
        assert!(!store.exists(&url).await.expect("exists"));
        assert!(store.upsert(&record).await.expect("upsert"));
        assert!(store.exists(&url).await.expect("exists"));

        let stats = store.stats().await.expect("stats");
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_niche.get("Food"), Some(&1));
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("scout.db");

        let handle = Platform::LinkedIn.parse_handle("jane-doe").expect("handle");
        let url = Platform::LinkedIn.profile_url(&handle);

        let db = Database::new(&path).await.expect("open database");
        db.run_migrations().await.expect("migrate");
        db.upsert(&ProfileRecord::new(Platform::LinkedIn, handle, url.clone()))
            .await
            .expect("upsert");
        db.close().await;

        let db = Database::new(&path).await.expect("reopen database");
        assert_eq!(db.get_schema_version().await.expect("version"), 1);
        assert!(db.exists(&url).await.expect("exists"));
    }
}
