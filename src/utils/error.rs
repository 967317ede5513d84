//! Error types and handling
//!
//! Every failure raised while serving a request ends up as an [`AppError`],
//! which renders the uniform JSON error payload. The payload always carries
//! the same `code` label; the `error` field names the failure kind so clients
//! can tell a disabled route from a missing generator or a rejected field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Code label shared by every error payload the REST API emits.
pub const REST_ERROR_CODE: &str = "rest_data_error";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// The route is switched off in the settings store (403)
    #[error("This route is disabled via the plugin settings.")]
    RouteDisabled(String),

    /// Resource not found, invalid id or empty collection (404)
    #[error("{0}")]
    NotFound(String),

    /// A required or supplied field failed validation (400)
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Request could not be interpreted at all (400)
    #[error("{0}")]
    BadRequest(String),

    /// The persistence store failed or returned nothing (500)
    #[error("{0}")]
    Database(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        AppError::Database(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    /// Field name carried by a validation error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AppError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Machine-readable failure kind, reported in the `error` field
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::RouteDisabled(_) => "route_disabled",
            AppError::NotFound(_) => "not_found",
            AppError::Validation { .. } => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "persistence_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Conventional HTTP status for this kind of failure
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RouteDisabled(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error kind identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Error code label for programmatic handling
    pub code: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response carrying the shared code label
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            code: REST_ERROR_CODE.to_string(),
            details: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, error_type = self.kind(), "Request error");
        }

        let mut body = ErrorResponse::new(self.kind(), self.to_string());
        if let Some(field) = self.field() {
            body = body.with_details(serde_json::json!({ "field": field }));
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
