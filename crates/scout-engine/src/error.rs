//! Engine error types.

use thiserror::Error;

/// Fatal discovery failures.
///
/// Per-step extraction and navigation errors are logged and skipped; only a
/// feed session that cannot be opened ends a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The page controller could not open the starting page.
    #[error("failed to open feed session at {url}: {reason}")]
    SessionOpen {
        /// Page the session was opened at
        url: String,
        /// Controller error text
        reason: String,
    },
}

/// Candidate file errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed CSV or a write failure inside the CSV writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened or flushed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine file operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_open_display() {
        let err = DiscoveryError::SessionOpen {
            url: "https://www.instagram.com/reels/".to_string(),
            reason: "browser unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to open feed session at https://www.instagram.com/reels/: browser unavailable"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "creators.csv").into();
        assert!(matches!(err, EngineError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
