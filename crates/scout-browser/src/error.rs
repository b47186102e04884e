use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("extraction failed: {0}")]
    ExtractionError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("session closed")]
    SessionClosed,

    #[error("invalid proxy: {0}")]
    InvalidProxy(String),
}
