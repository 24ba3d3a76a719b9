use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use agrihub_services::ServiceError;
use agrihub_types::Envelope;

use crate::actions::SubmitError;
use crate::forms::ValidationError;

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::Success(data)))
}

/// A data-layer read. Failures are the backend's, so they leave as 502.
pub fn fetched<T>(envelope: Envelope<T>) -> ApiResult<T> {
    envelope.into_result().map_err(ApiError::Upstream).and_then(ok)
}

/// A single-row read, 404 with `missing` when there is no such row.
pub fn found<T>(envelope: Envelope<Option<T>>, missing: &str) -> Result<T, ApiError> {
    envelope
        .into_result()
        .map_err(ApiError::Upstream)?
        .ok_or_else(|| ApiError::NotFound(missing.to_string()))
}

/// Every failure leaves the API as a `{success: false, error}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sign in required")]
    Unauthorized,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Service failures, with `context` prepended for the user.
    pub fn service(context: &str, e: ServiceError) -> Self {
        match e {
            ServiceError::MissingApiKey(_) => Self::Unavailable(e.to_string()),
            e => Self::Upstream(format!("{context}{e}")),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(v) => Self::Invalid(v),
            SubmitError::Rejected(msg) => Self::Rejected(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()>::failure(&self);
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_unavailable_not_upstream() {
        let e = ApiError::service("Analysis failed: ", ServiceError::MissingApiKey("GEMINI_API_KEY"));
        assert_eq!(e.status(), StatusCode::SERVICE_UNAVAILABLE);

        let e = ApiError::service("Analysis failed: ", ServiceError::InvalidFormat);
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.to_string(), "Analysis failed: Invalid response format from AI model");
    }

    #[test]
    fn reads_split_missing_from_backend_failures() {
        let e = found::<i64>(Envelope::Success(None), "Post not found").unwrap_err();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        assert_eq!(e.to_string(), "Post not found");

        let e = found::<i64>(Envelope::failure("connection reset"), "Post not found").unwrap_err();
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(found(Envelope::Success(Some(7)), "Post not found").unwrap(), 7);

        let e = fetched::<Vec<i64>>(Envelope::failure("timeout")).unwrap_err();
        assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
    }
}
