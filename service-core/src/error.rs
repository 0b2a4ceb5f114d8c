use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// 400 rendered as plain text.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 400 rendered as the JSON failure envelope.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported option: {0}")]
    UnsupportedOption(String),

    /// The upstream provider call failed. The message reaches the caller verbatim.
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Failure envelope shared by both functions: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

impl FailureBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_)
            | AppError::ValidationError(_)
            | AppError::UnsupportedOption(_) => StatusCode::BAD_REQUEST,
            AppError::ProviderError(_) | AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::MethodNotAllowed => plain_text(status, "Method Not Allowed".to_string()),
            AppError::BadRequest(msg) => plain_text(status, msg),
            AppError::ValidationError(msg)
            | AppError::UnsupportedOption(msg)
            | AppError::ProviderError(msg) => (status, Json(FailureBody::new(msg))).into_response(),
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal server error");
                (status, Json(FailureBody::new("Internal server error"))).into_response()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                (status, Json(FailureBody::new("Configuration error"))).into_response()
            }
        }
    }
}

fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
