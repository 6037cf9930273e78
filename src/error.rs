use std::io;
use thiserror::Error;

/// Errors surfaced by backup operations.
///
/// Best-effort sub-steps (copying one of several matched files, copying the
/// restore point folder) never produce these; their failures are collected as
/// warnings on the operation outcome instead.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Bad user input: slot, backup name, or folder name.
    #[error("{0}")]
    Validation(String),

    /// The referenced backup folder or source files are absent.
    #[error("{0}")]
    NotFound(String),

    /// A rename target collides with an existing backup folder.
    #[error("{0}")]
    Conflict(String),

    /// A folder name that should follow the naming convention does not.
    #[error("{0}")]
    Format(String),

    /// An underlying copy/move/delete failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> BackupError {
        BackupError::Io {
            context: context.into(),
            source,
        }
    }

    /// The HTTP status this error maps to at the routing layer.
    pub fn status(&self) -> u16 {
        match self {
            BackupError::Validation(_) => 400,
            BackupError::NotFound(_) => 404,
            BackupError::Conflict(_) => 409,
            BackupError::Format(_) => 422,
            BackupError::Io { .. } => 500,
        }
    }
}
