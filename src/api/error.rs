//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::registration::RegistrationError;
use crate::report::ReportError;
use crate::request::ProcessingError;
use crate::upload::UploadError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// Form input the user can fix (shown inline next to the field).
    #[error("{message}")]
    Validation { code: &'static str, message: String },
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Error generating PDF: {0}")]
    ReportFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Validation { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, code, message)
            }
            ApiError::UnsupportedMedia(detail) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA",
                detail,
            ),
            ApiError::PayloadTooLarge(detail) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", detail)
            }
            ApiError::ReportFailed(detail) => {
                tracing::error!(detail = %detail, "Report generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPORT_FAILED",
                    format!("Error generating PDF: {detail}"),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::MissingName => ApiError::validation("MISSING_NAME", err.to_string()),
            ProcessingError::Registration(RegistrationError::Missing) => {
                ApiError::validation("MISSING_REGISTRATION", err.to_string())
            }
            ProcessingError::Registration(RegistrationError::InvalidFormat(_)) => {
                ApiError::validation("INVALID_REGISTRATION", err.to_string())
            }
            ProcessingError::NoOperationSelected => {
                ApiError::validation("NO_OPERATION", err.to_string())
            }
            ProcessingError::ParameterMismatch { .. } | ProcessingError::WeightOutOfRange(_) => {
                ApiError::validation("INVALID_PARAMETER", err.to_string())
            }
            ProcessingError::Transform(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Empty => ApiError::validation("MISSING_IMAGE", "Please upload an image"),
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) => ApiError::UnsupportedMedia(err.to_string()),
            UploadError::TooSmall | UploadError::Decode(_) => ApiError::BadRequest(err.to_string()),
            UploadError::Encode(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::ReportFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_422_with_code() {
        let response = ApiError::validation("NO_OPERATION", "Please select at least one operation")
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NO_OPERATION");
        assert_eq!(json["error"]["message"], "Please select at least one operation");
    }

    #[tokio::test]
    async fn invalid_registration_maps_to_inline_message() {
        let err: ApiError =
            ProcessingError::Registration(RegistrationError::InvalidFormat("x".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_REGISTRATION");
        assert_eq!(
            json["error"]["message"],
            crate::registration::INVALID_REGISTRATION_MESSAGE
        );
    }

    #[tokio::test]
    async fn report_failure_is_generic_500() {
        let err: ApiError = ReportError::Pdf("boom".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "REPORT_FAILED");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Error generating PDF:"));
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("join error".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn upload_errors_map_to_statuses() {
        let too_large: ApiError = UploadError::TooLarge { limit_mb: 1 }.into();
        assert_eq!(too_large.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let unsupported: ApiError = UploadError::UnsupportedType("image/gif".into()).into();
        assert_eq!(
            unsupported.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );

        let empty: ApiError = UploadError::Empty.into();
        let json = body_json(empty.into_response()).await;
        assert_eq!(json["error"]["code"], "MISSING_IMAGE");
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("Unknown operation: modulo".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
