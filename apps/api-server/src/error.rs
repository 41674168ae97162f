//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the API Server                         │
//! │                                                                         │
//! │  Handler → Service → Repository                                        │
//! │                          │                                              │
//! │     DbError::Rejected(CoreError) ──┐                                   │
//! │     DbError::QueryFailed(..) ──────┤                                   │
//! │     QrError / StorageError ────────┼──► ApiError ──► IntoResponse      │
//! │     JsonRejection / Multipart ─────┘                                   │
//! │                                                                         │
//! │  Response body (every error):                                          │
//! │     {"status": "error", "message": "Product ID 7 not found."}         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Codes
//! | Variant             | Status |
//! |---------------------|--------|
//! | `BadRequest`        | 400    |
//! | `InsufficientStock` | 400    |
//! | `Decode`            | 400    |
//! | `NotFound`          | 404    |
//! | `PayloadTooLarge`   | 413    |
//! | `Unavailable`       | 503    |
//! | `Internal`          | 500    |

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ims_core::CoreError;
use ims_db::DbError;

use crate::qr::QrError;
use crate::storage::StorageError;

/// API error returned from handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Malformed request or a field rule violation.
    #[error("{0}")]
    BadRequest(String),

    /// Referenced product does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A cart line asks for more than is in stock.
    #[error("{0}")]
    InsufficientStock(String),

    /// Uploaded image could not be turned into a product payload.
    #[error("{0}")]
    Decode(String),

    /// Request body over `max_upload_bytes`.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// A dependency (the database) is not reachable.
    #[error("{0}")]
    Unavailable(String),

    /// Anything else. The raw error text is echoed to the caller.
    #[error("{0}")]
    Internal(String),
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InsufficientStock(_) | ApiError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts business rejections to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(_) => ApiError::NotFound(message),
            CoreError::InsufficientStock { .. } => ApiError::InsufficientStock(message),
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } | CoreError::Validation(_) => {
                ApiError::BadRequest(message)
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(core) => core.into(),
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QrError> for ApiError {
    fn from(err: QrError) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(err.body_text());
        }
        ApiError::BadRequest(err.body_text())
    }
}
