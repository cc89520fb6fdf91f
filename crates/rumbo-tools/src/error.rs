//! Error types for rumbo-tools

use crate::commerce::CommerceError;
use crate::mcp::McpError;
use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool not found
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed
    #[error("execution failed: {0}")]
    Execution(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tool is registered but disabled
    #[error("tool disabled: {0}")]
    Disabled(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Maps server failure
    #[error("maps server error: {0}")]
    Mcp(#[from] McpError),

    /// Commerce provider failure
    #[error("commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
