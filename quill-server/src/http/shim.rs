//! Route registration and request-argument extraction
//!
//! [`Routes`] keeps a readable table of every registered handler next to the
//! axum router. [`Params`] turns a request into a typed argument struct,
//! reading the JSON, form or multipart body of a POST, the query string of
//! a GET, and the path parameters of either.

use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, RawPathParams, Request};
use axum::handler::Handler;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::ApiError;

/// One entry of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub handler: &'static str,
}

/// Router plus the list of what was registered on it.
pub struct Routes<S> {
    router: Router<S>,
    infos: Vec<RouteInfo>,
}

impl<S> Default for Routes<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Routes<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            infos: Vec::new(),
        }
    }

    pub fn get<H, T>(mut self, path: &'static str, name: &'static str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.record("GET", path, name);
        self.router = self.router.route(path, get(handler));
        self
    }

    pub fn post<H, T>(mut self, path: &'static str, name: &'static str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.record("POST", path, name);
        self.router = self.router.route(path, post(handler));
        self
    }

    fn record(&mut self, method: &'static str, path: &'static str, handler: &'static str) {
        tracing::info!("add route {} {} => {}", method, path, handler);
        self.infos.push(RouteInfo {
            method,
            path,
            handler,
        });
    }

    pub fn merge(mut self, other: Routes<S>) -> Self {
        self.router = self.router.merge(other.router);
        self.infos.extend(other.infos);
        self
    }

    pub fn infos(&self) -> &[RouteInfo] {
        &self.infos
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

/// Argument struct a handler receives through [`Params`].
///
/// Names in `REQUIRED` must be present in the request; everything else is
/// left to serde (unknown keys are ignored, `Option` fields may be absent).
pub trait Arguments: DeserializeOwned + Send {
    const REQUIRED: &'static [&'static str] = &[];
}

/// Handler arguments gathered from body, query string and path.
#[derive(Debug)]
pub struct Params<T>(pub T);

impl<S, T> FromRequest<S> for Params<T>
where
    S: Send + Sync,
    T: Arguments,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let path_args: Vec<(String, String)> =
            match RawPathParams::from_request_parts(&mut parts, state).await {
                Ok(params) => params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
                Err(_) => Vec::new(),
            };

        let mut args = if parts.method == Method::POST {
            let content_type = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| ApiError::bad_request("Missing Content-Type."))?;
            let req = Request::from_parts(parts, body);
            body_args(req, state, &content_type).await?
        } else if parts.method == Method::GET {
            query_args(&parts.uri)?
        } else {
            Map::new()
        };

        for (name, value) in path_args {
            if args.contains_key(&name) {
                tracing::warn!("Duplicate arg name in path and request args: {}", name);
            }
            args.insert(name, Value::String(value));
        }

        if let Some(missing) = T::REQUIRED.iter().find(|name| !args.contains_key(**name)) {
            return Err(ApiError::bad_request(format!("Missing argument: {}", missing)));
        }

        tracing::debug!("call with args: {:?}", args);
        serde_json::from_value(Value::Object(args))
            .map(Params)
            .map_err(|e| ApiError::bad_request(format!("Invalid arguments: {}", e)))
    }
}

async fn body_args<S>(
    req: Request,
    state: &S,
    content_type: &str,
) -> Result<Map<String, Value>, ApiError>
where
    S: Send + Sync,
{
    let ct = content_type.to_ascii_lowercase();

    if ct.starts_with("application/json") {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return match value {
            Value::Object(map) => Ok(map),
            _ => Err(ApiError::bad_request("JSON body must be object.")),
        };
    }

    if ct.starts_with("application/x-www-form-urlencoded") {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok(first_values(pairs));
    }

    if ct.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let mut pairs = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            // File parts are not arguments
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            pairs.push((name, text));
        }
        return Ok(first_values(pairs));
    }

    Err(ApiError::bad_request(format!(
        "Unsupported Content-Type: {}",
        content_type
    )))
}

fn query_args(uri: &axum::http::Uri) -> Result<Map<String, Value>, ApiError> {
    if uri.query().map_or(true, str::is_empty) {
        return Ok(Map::new());
    }
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(first_values(pairs))
}

/// Keep the first value of repeated keys.
fn first_values(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.entry(k).or_insert(Value::String(v));
    }
    map
}

/// Accept a string, number or bool as an optional string argument.
///
/// Form and query values are always strings, JSON clients may send `2`
/// for a page number.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
