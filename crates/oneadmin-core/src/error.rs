use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side form check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The gateway answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Short error code string used in CLI output and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ConsoleError::Config(_) => "CONFIG_ERROR",
            ConsoleError::Validation(_) => "VALIDATION_ERROR",
            ConsoleError::Rejected(_) => "REJECTED",
            ConsoleError::Transport(_) => "TRANSPORT_ERROR",
            ConsoleError::Status { .. } => "HTTP_STATUS",
            ConsoleError::NotLoggedIn => "NOT_LOGGED_IN",
            ConsoleError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ConsoleError::Storage(_) => "STORAGE_ERROR",
            ConsoleError::Serialization(_) => "SERIALIZATION_ERROR",
            ConsoleError::Io(_) => "IO_ERROR",
            ConsoleError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ConsoleError::Validation(msg.into())
    }

    /// True when the failure happened before anything reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ConsoleError::Validation(_)
                | ConsoleError::NotLoggedIn
                | ConsoleError::PermissionDenied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
