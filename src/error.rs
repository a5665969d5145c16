use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Summarization error: {0}")]
    SummarizerError(String),

    #[error("Request processing timed out")]
    Timeout,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SummarizerError(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::SummarizerError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
