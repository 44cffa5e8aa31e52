use thiserror::Error;

/// Failures the version-manager backend can surface. Mutating operations
/// swallow these into a boolean result; queries propagate them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("command exited unsuccessfully: {stderr}")]
    CommandFailed { stderr: String },

    #[error("io failure ({kind}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("network failure during {operation}: {reason}")]
    Network {
        operation: &'static str,
        reason: String,
    },
}

impl BackendError {
    pub fn command_failed(stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            stderr: stderr.into(),
        }
    }

    pub fn network(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Network {
            operation,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(source: std::io::Error) -> Self {
        BackendError::Io {
            kind: source.kind(),
            message: source.to_string(),
        }
    }
}
