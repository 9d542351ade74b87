use carta_core::ErrorKind;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("resource not found: {path}")]
    NotFound { path: String },
    #[error("backend returned status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("timeout while calling backend: {path}")]
    Timeout { path: String },
    #[error("cannot connect to backend: {path}")]
    Unavailable { path: String },
    #[error("transport failure calling {path}: {detail}")]
    Transport { path: String, detail: String },
}

impl BackendError {
    /// Transient failures are worth retrying at the transport layer; HTTP
    /// status failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::BackendTimeout,
            Self::Unavailable { .. } => ErrorKind::BackendUnavailable,
            Self::NotFound { .. } | Self::Status { .. } | Self::Transport { .. } => {
                ErrorKind::BackendError
            }
        }
    }
}
