//! Error types for the completion, speech, and HTTP layers.
//!
//! Completion failures never become HTTP errors: the chat handler folds
//! them into the reply text. Only missing input, synthesis failures, and a
//! missing audio artifact map to non-200 statuses.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(String),
    #[error("request to completion service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("prompt was blocked: {0}")]
    Blocked(String),
    #[error("completion service returned no text")]
    Empty,
    #[error("unexpected completion response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("No text to speak")]
    EmptyText,
    #[error("TTS request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("TTS endpoint returned HTTP {status} for part {part} of {total}")]
    Status { status: u16, part: usize, total: usize },
    #[error("failed to write audio to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build completion client: {0}")]
    Completion(#[from] CompletionError),
    #[error("failed to build TTS client: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // The chat page reads `response` for bad input, so keep that key here.
            ApiError::InvalidInput(m) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "response": m }))).into_response()
            }
            ApiError::NotFound(m) => {
                warn!(message = %m, "not found");
                (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
            }
            ApiError::Synthesis(e) => {
                error!(error = %e, "speech synthesis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
            ApiError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": m }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (ApiError::InvalidInput("No input provided".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("Audio file not found".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Synthesis(SynthesisError::EmptyText),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn synthesis_error_message_is_passed_through() {
        let err = ApiError::from(SynthesisError::EmptyText);
        assert_eq!(err.to_string(), "No text to speak");
    }
}
