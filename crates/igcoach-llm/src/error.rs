use thiserror::Error;

/// Errors returned by [`crate::ChatClient`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the chat-completion shape.
    #[error("JSON deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The response parsed but carried no usable text.
    #[error("completion response contained no content")]
    EmptyCompletion,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
