//! Connection pool setup.

use crate::error::{Result, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Open a connection pool, creating the database file and its directory if missing.
///
/// An in-memory database lives only as long as its single connection, so it
/// gets a pool of one.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();
    let path_str = path
        .to_str()
        .ok_or_else(|| StoreError::Open("invalid database path: not valid UTF-8".to_string()))?;

    let (connect_options, max_connections) = if path_str == IN_MEMORY {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?;
        (options, 1)
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        (options, 5)
    };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if max_connections == 1 {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| StoreError::Open(format!("failed to initialize pool: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_pool() {
        let pool = open_pool(IN_MEMORY).await.expect("open in-memory pool");
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("select 1");
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creates_directories() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("nested").join("scout.db");

        let pool = open_pool(&path).await.expect("open file pool");
        pool.close().await;

        assert!(path.exists());
    }
}
