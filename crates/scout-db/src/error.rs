//! Store error types.

use thiserror::Error;

/// Profile store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the database.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Record rejected before writing.
    #[error("invalid record: {0}")]
    Invalid(String),

    /// Failed to decode a stored value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization of a JSON column failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error while preparing the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
