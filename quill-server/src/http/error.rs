//! API error types with IntoResponse
//!
//! Errors are converted to `{"error", "data", "message"}` JSON bodies with
//! matching status codes. 5xx details are logged, never sent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;
use crate::orm::OrmError;
use crate::views::RenderError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Input value invalid (400). `field` names the offending input.
    Value { field: String, message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, message: String },

    /// Signed-in user lacks the rights (403)
    Permission { message: String },

    /// Operation refused with a custom error code (400)
    Failed {
        error: &'static str,
        data: String,
        message: String,
    },

    /// Request could not be turned into arguments (400)
    BadRequest { message: String },

    /// Database error (500, logged)
    Database(OrmError),

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Value {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound {
            resource,
            message: format!("{} not found", resource),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Value { .. } | Self::Failed { .. } | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Permission { .. } => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Value { .. } => "value:invalid",
            Self::NotFound { .. } => "value:notfound",
            Self::Permission { .. } => "permission:forbidden",
            Self::Failed { error, .. } => error,
            Self::BadRequest { .. } => "request:invalid",
            Self::Database(_) | Self::Internal { .. } => "internal:error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (data, message) = match self {
            Self::Value { field, message } => (field, message),
            Self::NotFound { resource, message } => (resource.to_lowercase(), message),
            Self::Permission { message } => ("permission".to_string(), message),
            Self::Failed { data, message, .. } => (data, message),
            Self::BadRequest { message } => (String::new(), message),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (String::new(), "an internal error occurred".to_string())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (String::new(), "an internal error occurred".to_string())
            }
        };

        let body = json!({
            "error": code,
            "data": data,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Value {
            field: e.field().to_string(),
            message: e.to_string(),
        }
    }
}

impl From<OrmError> for ApiError {
    fn from(e: OrmError) -> Self {
        Self::Database(e)
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}
