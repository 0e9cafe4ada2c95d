use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Documentation URL carried in every error envelope.
pub const REFERENCE_ERROR_URL: &str = "https://tools.ietf.org/html/rfc7231";

const INTERNAL_ERROR_REASON: &str = "The server encountered an unexpected condition that \
     prevented it from fulfilling the request";

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidArgument(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "notFound",
            ApiError::InvalidArgument(_) => "invalidArgument",
            ApiError::InvalidInput(_) => "invalidInput",
            ApiError::Internal(_) => "internalError",
        }
    }

    /// Build the uniform envelope body for this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        let reason = match self {
            ApiError::Internal(_) => INTERNAL_ERROR_REASON.to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            message: self.to_string(),
            reason,
            reference_error: REFERENCE_ERROR_URL,
            code: self.code(),
        }
    }
}

/// Uniform error body returned on every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub reason: String,
    #[serde(rename = "referenceError")]
    pub reference_error: &'static str,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}
