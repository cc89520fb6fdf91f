//! Error types for rumbo-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The query failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Every specialist call failed and nothing could answer directly
    #[error("all {attempted} specialist calls failed")]
    AllProvidersFailed {
        /// Trace of the failed request
        trace_id: String,
        /// Number of calls attempted
        attempted: usize,
    },
}

impl Error {
    /// Whether the caller sent a bad request
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
