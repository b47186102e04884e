//! Error types for platform API clients.

use thiserror::Error;

/// Errors returned by a [`ProfileApi`](crate::ProfileApi) call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("API error ({platform}): status {status}, {message}")]
    Status {
        /// Platform name
        platform: String,
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("failed to parse {platform} response: {message}")]
    Parse {
        /// Platform name
        platform: String,
        /// Error message
        message: String,
    },

    /// Client setup failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
