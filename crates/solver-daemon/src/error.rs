//! Error types for solver-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use solver_engine::SolveError;
use thiserror::Error;

/// Daemon-level errors raised during startup
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-level errors, the service's full error taxonomy: client
/// mistakes map to 400, everything else to 500
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unparseable input
    #[error("{0}")]
    BadRequest(String),

    /// Evaluation failure inside the engine
    #[error("{0}")]
    Internal(String),
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::EmptyExpression | SolveError::Parse(_) => {
                ApiError::BadRequest(format!("Invalid mathematical expression: {err}"))
            }
            SolveError::Eval(_) => ApiError::Internal(format!("Server error: {err}")),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("test".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn solve_errors_split_into_client_and_server() {
        let parse: ApiError = solver_engine::solve("2+*").unwrap_err().into();
        assert!(matches!(parse, ApiError::BadRequest(_)));

        let eval: ApiError = solver_engine::solve("f(2)").unwrap_err().into();
        assert!(matches!(eval, ApiError::Internal(_)));
    }
}
