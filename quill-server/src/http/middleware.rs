//! Request pipeline: logging, cookie authentication, template rendering
//!
//! Layer order, outermost first: [`log_requests`], [`authenticate`],
//! [`render_templates`]. Templates render after the handler ran, with the
//! user that [`authenticate`] attached to the request.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use super::error::ApiError;
use super::reply::{PendingTemplate, Reply};
use crate::models::User;
use crate::session::{cookie_value, SessionToken};
use crate::state::AppState;
use crate::views::{self, RenderEnv};

/// Prefix of the admin pages
const MANAGE_PREFIX: &str = "/manage/";

/// The signed-in user, if the session cookie checked out.
///
/// The stored password digest is already masked.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|u| u.admin)
    }

    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::permission("Please sign in first."))
    }

    pub fn require_admin(&self) -> Result<&User, ApiError> {
        match self.0.as_ref() {
            Some(user) if user.admin => Ok(user),
            _ => Err(ApiError::permission("Admin privileges required.")),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    tracing::info!("Request: {} {}", req.method(), req.uri().path());
    next.run(req).await
}

/// Resolve the session cookie to a user and gate the admin pages.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    tracing::info!("check user: {} {}", req.method(), req.uri().path());

    let user = match cookie_value(req.headers(), state.signer().cookie_name()) {
        Some(value) => session_user(&state, value).await,
        None => None,
    };
    if let Some(user) = &user {
        tracing::info!("set current user: {}", user.email);
    }

    let is_admin = user.as_ref().is_some_and(|u| u.admin);
    if req.uri().path().starts_with(MANAGE_PREFIX) && !is_admin {
        return Reply::redirect("/signin").into_response();
    }

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

/// Look up and verify the user behind a cookie value. Any failure means
/// "not signed in".
async fn session_user(state: &AppState, value: &str) -> Option<User> {
    let token = SessionToken::parse(value).ok()?;
    let user = match state.db().find::<User>(token.user_id.as_str()).await {
        Ok(Some(user)) => user,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!("session lookup failed: {}", e);
            return None;
        }
    };

    let now = chrono::Utc::now().timestamp();
    match state.signer().verify(&token, &user, now) {
        Ok(()) => Some(user.masked()),
        Err(e) => {
            tracing::info!("rejected session cookie: {}", e);
            None
        }
    }
}

/// Render a template left pending by the handler.
pub async fn render_templates(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .unwrap_or_default();

    let mut response = next.run(req).await;
    let Some(pending) = response.extensions_mut().remove::<PendingTemplate>() else {
        return response;
    };

    let env = RenderEnv {
        site_title: &state.site().title,
        user: current.user(),
        now: crate::models::now_ts(),
    };
    match views::render(pending.name, pending.context, &env) {
        Ok(html) => {
            let (mut parts, _) = response.into_parts();
            let mut rendered = Html(html).into_response();
            // keep status and any cookies the handler set
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            parts.headers.extend(rendered.headers_mut().drain());
            Response::from_parts(parts, rendered.into_body())
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
