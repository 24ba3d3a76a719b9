use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// The backend answered with an error body; `message` is its text.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("{0}")]
    NotFound(String),
    #[error("nothing to update")]
    EmptyUpdate,
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("store unavailable: {0}")]
    Store(String),
}

impl From<reqwest::Error> for DbError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
