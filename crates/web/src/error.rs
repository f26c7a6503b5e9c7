//! Error handling with RFC 7807 Problem Details for JSON responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::backend::BackendError;

pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<marcus_core::Error> for AppError {
    fn from(err: marcus_core::Error) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unreachable(_) => Self::ServiceUnavailable(err.to_string()),
            BackendError::Status { status, .. } if status >= 500 => {
                Self::ServiceUnavailable(err.to_string())
            }
            BackendError::Status { .. } | BackendError::InvalidResponse(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    problem_type: String,
    title: String,
    status: u16,
    detail: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn from_error(err: &AppError) -> Self {
        let status = err.status_code();
        let title = status
            .canonical_reason()
            .map_or_else(|| "Error".to_string(), ToString::to_string);

        Self::new(status, title, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        let response = ErrorResponse::from_error(&self);
        (
            status,
            [(http::header::CONTENT_TYPE, "application/problem+json")],
            Json(response),
        )
            .into_response()
    }
}
