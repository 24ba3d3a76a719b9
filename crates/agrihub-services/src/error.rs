use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("{provider} API error: {status}")]
    Http { provider: &'static str, status: u16 },
    #[error("missing api key: {0} environment variable not set")]
    MissingApiKey(&'static str),
    #[error("{provider} returned no content")]
    EmptyReply { provider: &'static str },
    #[error("Invalid response format from AI model")]
    InvalidFormat,
    #[error("Incomplete prediction data received")]
    IncompletePrediction,
    #[error("All AI models are currently unavailable. Please check your API key or try again later.")]
    AllModelsUnavailable,
    #[error("Invalid data received")]
    InvalidNewsData,
}

impl ServiceError {
    /// Whether the next model in a fallback list is worth trying.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout | Self::Http { .. } | Self::EmptyReply { .. }
        )
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Transport(e.to_string())
    }
}
