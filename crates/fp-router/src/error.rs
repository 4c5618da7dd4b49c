//! Routing engine error types.

use thiserror::Error;

/// Errors raised while ingesting an API description or emitting artifacts.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid API description: {0}")]
    Parse(String),

    #[error("API description at {0} yields no routing rules")]
    NoRules(String),

    #[error("failed to render routing config: {0}")]
    Render(String),
}

/// Convenience alias for routing engine results.
pub type RouterResult<T> = Result<T, RouterError>;
