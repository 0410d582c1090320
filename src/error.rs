//! Error types and HTTP response conversion.
//!
//! All errors are automatically converted to appropriate HTTP responses
//! with JSON error bodies. Store failures are logged and answered with a
//! generic message so query text and credentials never reach the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Gateway error types with automatic HTTP status code mapping.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid column name")]
    InvalidColumn,

    #[error("Invalid format for download")]
    InvalidExportFormat,

    #[error("Request timed out")]
    RequestTimeout,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] sonic_rs::Error),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("internal error: {0}")]
    InternalError(#[from] eyre::Error),

    #[error("Backend unavailable")]
    BackendUnavailable,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::InvalidColumn | GatewayError::InvalidExportFormat => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            GatewayError::RequestTimeout => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            GatewayError::Store(err) => {
                tracing::error!(error = %err, "store query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            GatewayError::Serialization(_)
            | GatewayError::Export(_)
            | GatewayError::InternalError(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            GatewayError::BackendUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Backend unavailable".to_string(),
            ),
        };

        let body = ErrorResponse { error: message };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn body_string(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_invalid_column_display() {
        assert_eq!(GatewayError::InvalidColumn.to_string(), "Invalid column name");
    }

    #[test]
    fn test_backend_unavailable_display() {
        let err = GatewayError::BackendUnavailable;
        assert_eq!(err.to_string(), "Backend unavailable");
    }

    #[tokio::test]
    async fn test_invalid_column_response() {
        let response = GatewayError::InvalidColumn.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Invalid column name"}"#
        );
    }

    #[tokio::test]
    async fn test_request_timeout_response() {
        let response = GatewayError::RequestTimeout.into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"error":"Request timed out"}"#);
    }

    #[tokio::test]
    async fn test_invalid_export_format_response() {
        let response = GatewayError::InvalidExportFormat.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Invalid format for download"}"#
        );
    }

    #[tokio::test]
    async fn test_store_error_is_generic_500() {
        let err = GatewayError::Store(StoreError::Database(sqlx::Error::Protocol(
            "syntax error at or near \"DROP\" in SELECT * FROM trial".into(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert_eq!(body, r#"{"error":"Internal server error"}"#);
        assert!(!body.contains("SELECT"));
    }

    #[tokio::test]
    async fn test_store_timeout_is_500() {
        let err: GatewayError = StoreError::Timeout(Duration::from_secs(10)).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_error_response_status() {
        let err = GatewayError::InternalError(eyre::eyre!("password=hunter2"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_string(response).await.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_backend_unavailable_response_status() {
        let err = GatewayError::BackendUnavailable;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_from_store_error() {
        let err: GatewayError = StoreError::Timeout(Duration::from_millis(5)).into();
        assert!(matches!(err, GatewayError::Store(StoreError::Timeout(_))));
    }
}
