//! Error types for reclaim.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Batch operations never surface these directly; they fold per-path errors
//! into their result values instead.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for reclaim operations.
///
/// Each variant maps to a specific process exit code.
#[derive(Error, Debug)]
pub enum ReclaimError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// Validation found blocking system paths.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// A filesystem operation failed on a specific path.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The quarantine store could not complete an operation.
    #[error("Quarantine operation failed: {0}")]
    QuarantineError(String),

    /// A deletion batch removed nothing.
    #[error("Deletion failed: {0}")]
    DeletionFailed(String),

    /// An OS trash mechanism failed (missing binary, timeout, non-zero exit).
    #[error("Trash mechanism failed: {0}")]
    TrashError(String),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The user declined the confirmation prompt.
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl ReclaimError {
    /// Build an I/O error tagged with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReclaimError::UserError(_) => exit_codes::USER_ERROR,
            ReclaimError::ConfigError(_) => exit_codes::USER_ERROR,
            ReclaimError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            ReclaimError::Io { .. } => exit_codes::OPERATION_FAILURE,
            ReclaimError::DeletionFailed(_) => exit_codes::OPERATION_FAILURE,
            ReclaimError::QuarantineError(_) => exit_codes::OPERATION_FAILURE,
            ReclaimError::TrashError(_) => exit_codes::OPERATION_FAILURE,
            ReclaimError::Cancelled => exit_codes::CANCELLED,
        }
    }
}

/// Result type alias for reclaim operations.
pub type Result<T> = std::result::Result<T, ReclaimError>;
