use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Failures talking to the news provider
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news provider is not configured")]
    Disabled,
    #[error("network error: {0}")]
    Network(String),
    #[error("news provider returned HTTP {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Failures talking to the completion service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM features are disabled")]
    Disabled,
    #[error("LLM request timed out")]
    Timeout,
    #[error("LLM provider rate limited the request")]
    RateLimited,
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures delivering a newsletter email
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("SMTP send failed: {0}")]
    Transport(String),
}
