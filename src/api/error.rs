use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The two failure kinds a request can end in.
///
/// Validation errors go back to the caller verbatim with a 400. Service
/// errors are logged with their cause and reported with a fixed,
/// per-endpoint message and a 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Service {
        message: &'static str,
        cause: anyhow::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn invalid_request() -> Self {
        ApiError::Validation("Invalid request data".to_string())
    }

    pub fn service(message: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        ApiError::Service {
            message,
            cause: cause.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Service { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Validation(message) => {
                tracing::debug!(%message, "rejected request");
            }
            ApiError::Service { message, cause } => {
                let detail = format!("{:#}", cause);
                tracing::error!(error = %detail, "{}", message);
            }
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Maps store failures onto a service error with a fixed public message.
pub trait OrServiceError<T> {
    fn or_service(self, message: &'static str) -> ApiResult<T>;
}

impl<T> OrServiceError<T> for anyhow::Result<T> {
    fn or_service(self, message: &'static str) -> ApiResult<T> {
        self.map_err(|cause| ApiError::service(message, cause))
    }
}
