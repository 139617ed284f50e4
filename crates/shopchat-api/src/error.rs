use thiserror::Error;

/// Failures reported by the backend clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    AccountExists,
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// True when the failure happened below HTTP, e.g. the server was unreachable
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
