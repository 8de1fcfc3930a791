// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Global application error enum. Every failure maps to a stable machine
/// readable `kind` plus enough context (counts, ids) for the caller to act.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("attempt limit reached: {used} of {allowed} attempts used")]
    AttemptLimitReached { used: i64, allowed: i64 },

    #[error("not enough questions available: found {found}, need {need}")]
    InsufficientQuestions { found: usize, need: usize },

    #[error("session {0} not found")]
    SessionNotFound(i64),

    #[error("session {0} is not in progress")]
    SessionNotInProgress(i64),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Converts `sqlx::Error` into `AppError::Internal`.
/// Allows using the `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Converts the error into a JSON response with the appropriate HTTP status.
/// Body shape: `{"error": {"kind": "...", "message": "...", ...context}}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                json!({"kind": "VALIDATION", "message": message}),
            ),
            AppError::AttemptLimitReached { used, allowed } => (
                StatusCode::CONFLICT,
                json!({
                    "kind": "ATTEMPT_LIMIT_REACHED",
                    "message": message,
                    "attempts_used": used,
                    "attempts_allowed": allowed,
                }),
            ),
            AppError::InsufficientQuestions { found, need } => (
                StatusCode::CONFLICT,
                json!({
                    "kind": "INSUFFICIENT_QUESTIONS",
                    "message": message,
                    "found": found,
                    "need": need,
                }),
            ),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({
                    "kind": "SESSION_NOT_FOUND",
                    "message": message,
                    "session_id": id,
                }),
            ),
            AppError::SessionNotInProgress(id) => (
                StatusCode::CONFLICT,
                json!({
                    "kind": "SESSION_NOT_IN_PROGRESS",
                    "message": message,
                    "session_id": id,
                }),
            ),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({"kind": "NOT_FOUND", "message": message}),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"kind": "INTERNAL", "message": "Internal Server Error"}),
                )
            }
        };

        (status, Json(json!({ "error": body }))).into_response()
    }
}
