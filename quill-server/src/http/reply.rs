//! Handler return values and their HTTP encoding

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

const REDIRECT_PREFIX: &str = "redirect:";

/// What a handler produced, before it becomes a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Html(String),
    Text(String),
    Bytes(Vec<u8>),
    /// 302 to the given location
    Redirect(String),
    Json(Value),
    /// Rendered later by the template stage, with the current user injected
    Template { name: &'static str, context: Value },
    /// Bare status with an optional plain-text message
    Status(u16, Option<String>),
}

/// Template waiting in the response extensions to be rendered.
#[derive(Debug, Clone)]
pub struct PendingTemplate {
    pub name: &'static str,
    pub context: Value,
}

impl Reply {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }

    pub fn template(name: &'static str, context: Value) -> Self {
        Self::Template { name, context }
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ApiError::Internal {
                message: format!("response serialization failed: {}", e),
            })
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        match s.strip_prefix(REDIRECT_PREFIX) {
            Some(location) => Self::Redirect(location.to_owned()),
            None => Self::Html(s.to_owned()),
        }
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Vec<u8>> for Reply {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<u16> for Reply {
    fn from(code: u16) -> Self {
        Self::Status(code, None)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Html(body) => Html(body).into_response(),
            Self::Text(body) => (
                [(CONTENT_TYPE, "text/plain;charset=utf-8")],
                body,
            )
                .into_response(),
            Self::Bytes(body) => (
                [(CONTENT_TYPE, "application/octet-stream")],
                body,
            )
                .into_response(),
            Self::Redirect(location) => match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
                Err(_) => {
                    tracing::warn!("invalid redirect location: {:?}", location);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            Self::Json(value) => Json(value).into_response(),
            Self::Template { name, context } => {
                let mut response = StatusCode::OK.into_response();
                response
                    .extensions_mut()
                    .insert(PendingTemplate { name, context });
                response
            }
            Self::Status(code, message) => {
                let status = StatusCode::from_u16(code)
                    .ok()
                    .filter(|_| (100..600).contains(&code))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                match message {
                    Some(text) => (status, text).into_response(),
                    None => status.into_response(),
                }
            }
        }
    }
}
