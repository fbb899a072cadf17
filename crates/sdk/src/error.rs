use thiserror::Error;

/// Errors that can occur in the chatsync SDK
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport error from reqwest (connect failure, timeout, bad body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status} from {path}")]
    Status { status: u16, path: String },

    /// The polling loop was already started
    #[error("Polling loop already started")]
    AlreadyStarted,
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, ClientError>;
