use oneadmin_core::ConsoleError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// `success: false` from the gateway, carrying its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<ApiError> for ConsoleError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Http(e) => ConsoleError::Transport(e.to_string()),
            ApiError::Status { status, body } => ConsoleError::Status { status, body },
            ApiError::Rejected(msg) => ConsoleError::Rejected(msg),
            ApiError::Decode(msg) => ConsoleError::Transport(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
