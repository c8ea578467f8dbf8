//! Error types for the harness.

use thiserror::Error;

use crate::auth::AuthError;
use crate::backend::ResultCode;

/// Tool-level error: everything that can stop a CLI command.
///
/// Backend failures of an asynchronous flow arrive as [`AuthError`] through
/// the completion callback and are wrapped in [`HarnessError::Auth`]; a
/// flow that never completed inside the poll budget is a
/// [`HarnessError::Timeout`], which is kept apart from backend failures.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{operation} failed: {}", .code.describe())]
    Backend {
        operation: &'static str,
        code: ResultCode,
    },

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{operation} timed out after {waited_ms}ms")]
    Timeout {
        operation: &'static str,
        waited_ms: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn backend(operation: &'static str, code: ResultCode) -> Self {
        Self::Backend { operation, code }
    }

    /// Whether the error is a local timeout rather than a reported failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HarnessError>;
