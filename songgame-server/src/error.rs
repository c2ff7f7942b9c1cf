//! HTTP error mapping
//!
//! Game errors are user-facing: each maps to a status code and a stable
//! error code so the UI can pick the right warning.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use songgame_common::Error;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Error raised by the game itself
    #[error(transparent)]
    Game(#[from] Error),
}

/// Convenience result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Game(err) => match err {
                Error::DuplicateUpload => (StatusCode::CONFLICT, "DUPLICATE_UPLOAD"),
                Error::MalformedFile(_) => (StatusCode::BAD_REQUEST, "MALFORMED_FILE"),
                Error::MissingInput(_) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
                Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                Error::EmptyLibrary => (StatusCode::PRECONDITION_FAILED, "EMPTY_LIBRARY"),
                Error::UnknownPlayer(_) => (StatusCode::NOT_FOUND, "UNKNOWN_PLAYER"),
                Error::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
                Error::PlayersLocked => (StatusCode::CONFLICT, "PLAYERS_LOCKED"),
                Error::GameFinished => (StatusCode::CONFLICT, "GAME_FINISHED"),
                Error::Config(_) | Error::Io(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
