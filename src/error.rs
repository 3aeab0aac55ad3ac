use crate::domain::validation::ValidationErrors;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Validation failed")]
    ValidationFailed(ValidationErrors),
    #[error("Poll not found")]
    PollNotFound,
    #[error("Poll option not found")]
    OptionNotFound,
    #[error("Poll is closed")]
    PollClosed,
    #[error("Already voted on this poll")]
    AlreadyVoted,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        // Validation failures carry the per-field messages so the form
        // layer can render them next to the offending inputs.
        if let PollError::ValidationFailed(fields) = &self {
            let body = Json(json!({
                "error": "Validation failed",
                "fields": fields
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, error_message) = match &self {
            PollError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            PollError::PollNotFound => (StatusCode::NOT_FOUND, "Poll not found"),
            PollError::OptionNotFound => (StatusCode::NOT_FOUND, "Poll option not found"),
            PollError::PollClosed => (StatusCode::BAD_REQUEST, "Poll is closed"),
            PollError::AlreadyVoted => (StatusCode::CONFLICT, "Already voted on this poll"),
            PollError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str()),
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for PollError {
    fn from(error: sqlx::Error) -> Self {
        PollError::DatabaseError(error.to_string())
    }
}
