use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<orchestrator::OrchestratorError> for AppError {
    fn from(err: orchestrator::OrchestratorError) -> Self {
        match err {
            orchestrator::OrchestratorError::AlreadyRunning => AppError::Conflict(err.to_string()),
            orchestrator::OrchestratorError::InvalidTransition { .. }
            | orchestrator::OrchestratorError::RunAborted(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}
