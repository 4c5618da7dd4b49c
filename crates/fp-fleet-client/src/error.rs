//! Backend access error types.

use thiserror::Error;

/// Errors raised while talking to the record-keeping API.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable after {attempts} attempt(s): {message}")]
    Connection { attempts: u32, message: String },

    #[error("backend returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("backend request to {0} timed out")]
    Timeout(String),

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// Whether the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Connection { .. } | BackendError::Timeout(_) => true,
            BackendError::Status { status, .. } => *status >= 500,
            BackendError::Decode { .. } | BackendError::Config(_) => false,
        }
    }
}

/// Convenience alias for backend results.
pub type BackendResult<T> = Result<T, BackendError>;
