//! Error types for mvirt-docker.

use thiserror::Error;

use crate::action::ActionKind;
use crate::resource::ResourceKind;

/// Errors surfaced by a reconciliation pass.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or contradictory for the requested action.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Inspection output was not a structured record.
    #[error("failed to parse fact record on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No renderer exists for this action on this resource kind.
    #[error("unsupported operation: cannot render {action} for {resource}")]
    UnsupportedOperation {
        resource: ResourceKind,
        action: ActionKind,
    },

    /// The external tool exited non-zero.
    #[error("command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

/// Result type for mvirt-docker operations.
pub type Result<T> = std::result::Result<T, Error>;
