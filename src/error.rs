//! Crate-wide error type.
//!
//! Local conditions (missing session, malformed body, duplicate tracks) keep
//! their own variant so handlers can answer with a specific status code.
//! Transport and Spotify failures surface as upstream errors.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("duplicate tracks: {}", .duplicate_uris.join(", "))]
    DuplicateTracks { duplicate_uris: Vec<String> },
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("pagination did not terminate after {0} pages")]
    Pagination(u32),
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AppError::MalformedRequest(message.into())
    }

    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::MalformedRequest(_) | AppError::DuplicateTracks { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Upstream { status: 404, .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. }
            | AppError::Pagination(_)
            | AppError::Http(_)
            | AppError::Json(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::malformed(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Unauthenticated => json!({ "error": "not_authenticated" }),
            AppError::MalformedRequest(message) => json!({ "error": message }),
            AppError::DuplicateTracks { duplicate_uris } => json!({
                "error": "duplicate_tracks",
                "duplicate_uris": duplicate_uris,
            }),
            AppError::Config(_) | AppError::Io(_) => {
                tracing::error!(error = %self, "internal failure");
                json!({ "error": "internal_error" })
            }
            _ => {
                tracing::warn!(error = %self, "upstream failure");
                json!({ "error": "upstream_error", "detail": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
