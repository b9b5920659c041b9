use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned while delivering chat messages.
pub enum ChatError {
    /// The HTTP request could not be sent or its response not read.
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The chat service answered with a non-success status.
    #[error("chat service rejected message ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// The transport is missing required settings.
    #[error("chat transport misconfigured: {0}")]
    Config(String),
}

/// Convenience result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
