//! Error types for the equipment status server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::utc_timestamp;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The document store has no credentials configured
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// A read against the document store failed
    #[error("Query failed: {0}")]
    QueryFailure(String),

    /// A create or update against the document store failed
    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `error`
    pub status: String,
    pub message: String,
    pub timestamp: String,
    /// Underlying cause, only populated when debug logging is enabled
    pub error_details: Option<String>,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The equipment database is not configured".to_string(),
            ),
            AppError::QueryFailure(msg) => {
                tracing::error!("Query failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Failed to read equipment data".to_string())
            }
            AppError::WriteFailure(msg) => {
                tracing::error!("Write failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Failed to save equipment data".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = ErrorResponse {
            status: "error".to_string(),
            message,
            timestamp: utc_timestamp(),
            error_details: tracing::enabled!(tracing::Level::DEBUG).then(|| self.to_string()),
        };

        match serde_json::to_string_pretty(&body) {
            Ok(json) => (
                status,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                json,
            )
                .into_response(),
            Err(_) => status.into_response(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Unavailable("no key".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::QueryFailure("timeout".into()), StatusCode::BAD_GATEWAY),
            (AppError::WriteFailure("conflict".into()), StatusCode::BAD_GATEWAY),
            (AppError::NotFound("Equipment 9 not found".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("bad body".into()), StatusCode::BAD_REQUEST),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    async fn body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_details_follow_debug_level() {
        let debug = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let response = tracing::subscriber::with_default(debug, || {
            AppError::QueryFailure("gateway timeout".into()).into_response()
        });
        let json = body(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Failed to read equipment data");
        assert_eq!(json["error_details"], "Query failed: gateway timeout");

        let info = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .finish();
        let response = tracing::subscriber::with_default(info, || {
            AppError::QueryFailure("gateway timeout".into()).into_response()
        });
        let json = body(response).await;
        assert!(json["error_details"].is_null());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_internal_message_is_not_technical() {
        let (_, message) = AppError::Internal("socket closed".into()).status_and_message();
        assert_eq!(message, "Internal server error");
    }
}
