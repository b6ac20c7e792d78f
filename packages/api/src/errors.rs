//! Mapping engine failures onto HTTP responses.

use actors::EngineError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub fn json_error(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(json!({ "error": error.into() }))).into_response()
}

pub fn validation_failed(details: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Validation failed",
            "details": details,
        })),
    )
        .into_response()
}

pub fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "Job not found")
}

/// `failure` names the operation for 500 responses, e.g. "Failed to fetch jobs".
pub fn engine_error_to_response(err: EngineError, failure: &str) -> Response {
    match err {
        EngineError::Validation(e) => validation_failed(e.details),
        EngineError::NotFound(_) => not_found(),
        e @ EngineError::InvalidState { .. } => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        e @ (EngineError::Storage(_) | EngineError::Actor(_)) => {
            tracing::error!("{}: {}", failure, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": failure,
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
