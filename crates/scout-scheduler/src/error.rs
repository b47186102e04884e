//! Scheduler error types.

use thiserror::Error;
use uuid::Uuid;

/// Job queue errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    /// No job was ever submitted under this id.
    #[error("unknown job: {0}")]
    UnknownJob(Uuid),
}

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, JobError>;
