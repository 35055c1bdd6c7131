//! Registration, sign-in and the user list API

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use super::{newest_page, PageArgs};
use crate::http::error::ApiError;
use crate::http::middleware::CurrentUser;
use crate::http::reply::Reply;
use crate::http::shim::{Arguments, Params, Routes};
use crate::models::{DisplayName, Email, PasswordDigest, User};
use crate::orm::{Database, FindAll, OrmError};
use crate::session::{digests_match, hash_password};
use crate::state::AppState;

pub fn routes() -> Routes<AppState> {
    Routes::new()
        .post("/api/authenticate", "authenticate", authenticate)
        .get("/api/users", "api_get_users", api_get_users)
        .post("/api/users", "api_register_user", api_register_user)
}

#[derive(Debug, Deserialize)]
struct AuthenticateArgs {
    email: String,
    /// Client-side digest, not the clear password
    passwd: String,
}

impl Arguments for AuthenticateArgs {
    const REQUIRED: &'static [&'static str] = &["email", "passwd"];
}

#[derive(Debug, Deserialize)]
struct RegisterArgs {
    email: String,
    name: String,
    passwd: String,
}

impl Arguments for RegisterArgs {
    const REQUIRED: &'static [&'static str] = &["email", "name", "passwd"];
}

async fn find_by_email(db: &Database, email: &str) -> Result<Option<User>, ApiError> {
    let users: Vec<User> = db
        .find_all(
            FindAll::new()
                .filter("\"email\"=?", vec![email.into()])
                .limit(1),
        )
        .await?;
    Ok(users.into_iter().next())
}

/// Masked user as JSON, with a fresh session cookie.
fn signed_in(state: &AppState, user: User) -> Result<Response, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let cookie = state.signer().issue(&user, now);
    let body = Reply::json(&user.masked())?;
    Ok(([(SET_COOKIE, state.signer().set_cookie(&cookie))], body).into_response())
}

/// POST /api/authenticate
async fn authenticate(
    State(state): State<AppState>,
    Params(args): Params<AuthenticateArgs>,
) -> Result<Response, ApiError> {
    let email = args.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::value("email", "Invalid email."));
    }
    if args.passwd.is_empty() {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    let Some(user) = find_by_email(state.db(), &email).await? else {
        return Err(ApiError::value("email", "Email not exist."));
    };
    if !digests_match(&hash_password(user.id(), &args.passwd), &user.passwd) {
        return Err(ApiError::value("passwd", "Invalid password."));
    }

    tracing::info!("user signed in: {}", user.email);
    signed_in(&state, user)
}

/// POST /api/users
async fn api_register_user(
    State(state): State<AppState>,
    Params(args): Params<RegisterArgs>,
) -> Result<Response, ApiError> {
    let name = DisplayName::new(&args.name)?;
    let email = Email::new(&args.email)?;
    let digest = PasswordDigest::new(&args.passwd)?;

    if find_by_email(state.db(), email.as_str()).await?.is_some() {
        return Err(email_taken());
    }

    let mut user = User::register(email, name, &digest);
    state.db().save(&mut user).await.map_err(register_error)?;
    tracing::info!("user registered: {}", user.email);
    signed_in(&state, user)
}

fn email_taken() -> ApiError {
    ApiError::Failed {
        error: "register:failed",
        data: "email".to_string(),
        message: "Email is already in use.".to_string(),
    }
}

/// A concurrent registration can claim the email between lookup and insert.
fn register_error(e: OrmError) -> ApiError {
    if e.is_unique_violation() {
        email_taken()
    } else {
        e.into()
    }
}

/// GET /api/users (admin)
async fn api_get_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    current.require_admin()?;
    let (page, users) =
        newest_page::<User>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    let users: Vec<User> = users.into_iter().map(User::masked).collect();
    Ok(Reply::Json(json!({ "page": page, "users": users })))
}
