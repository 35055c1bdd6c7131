//! HTML pages
//!
//! Handlers return [`Reply::Template`]; the template stage renders them.

use axum::extract::State;
use axum::http::header::{HOST, REFERER, SET_COOKIE};
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use serde_json::json;

use super::{find_or_404, newest_page, IdArgs, PageArgs};
use crate::http::error::ApiError;
use crate::http::reply::Reply;
use crate::http::shim::{Params, Routes};
use crate::models::{thread_comments, Blog, Comment, User};
use crate::orm::FindAll;
use crate::state::AppState;

pub fn routes() -> Routes<AppState> {
    Routes::new()
        .get("/", "index", index)
        .get("/blog/{id}", "blog_page", blog_page)
        .get("/register", "register", register)
        .get("/signin", "signin", signin)
        .get("/signout", "signout", signout)
        .get("/manage/", "manage", manage)
        .get("/manage/comments", "manage_comments", manage_comments)
        .get("/manage/blogs", "manage_blogs", manage_blogs)
        .get("/manage/blogs/create", "manage_create_blog", manage_create_blog)
        .get("/manage/blogs/edit", "manage_edit_blog", manage_edit_blog)
        .get("/manage/users", "manage_users", manage_users)
}

/// GET /
async fn index(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, blogs) =
        newest_page::<Blog>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    Ok(Reply::template(
        "blogs.html",
        json!({ "page": page, "blogs": blogs }),
    ))
}

/// GET /blog/{id}
async fn blog_page(
    State(state): State<AppState>,
    Params(args): Params<IdArgs>,
) -> Result<Reply, ApiError> {
    let blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;
    let comments: Vec<Comment> = state
        .db()
        .find_all(
            FindAll::new()
                .filter("\"blog_id\"=?", vec![args.id.into()])
                .order_by("\"created_at\" asc"),
        )
        .await?;

    Ok(Reply::template(
        "blog.html",
        json!({ "blog": blog, "comments": thread_comments(comments) }),
    ))
}

/// GET /register
async fn register() -> Reply {
    Reply::template("register.html", json!({}))
}

/// GET /signin
async fn signin() -> Reply {
    Reply::template("signin.html", json!({}))
}

/// GET /signout - clear the cookie and go back where the user came from
async fn signout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let referer = headers.get(REFERER).and_then(|v| v.to_str().ok());
    let host = headers.get(HOST).and_then(|v| v.to_str().ok());
    let back = local_return_path(referer, host);
    tracing::info!("user signed out.");
    (
        [(SET_COOKIE, state.signer().clear_cookie())],
        Reply::redirect(back),
    )
}

/// Path on this site to send the browser back to, `/` unless the referer
/// is a local path or an absolute URL on `host`.
fn local_return_path(referer: Option<&str>, host: Option<&str>) -> String {
    let Some(uri) = referer.and_then(|r| r.parse::<Uri>().ok()) else {
        return "/".to_owned();
    };
    let same_site = match uri.authority() {
        None => uri.scheme().is_none(),
        Some(authority) => host.is_some_and(|h| authority.as_str().eq_ignore_ascii_case(h)),
    };
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    if !same_site || !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
        return "/".to_owned();
    }
    path.to_owned()
}

/// GET /manage/
async fn manage() -> Reply {
    Reply::from("redirect:/manage/comments")
}

/// GET /manage/comments
async fn manage_comments(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, comments) =
        newest_page::<Comment>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    Ok(Reply::template(
        "manage_comments.html",
        json!({ "page": page, "comments": comments }),
    ))
}

/// GET /manage/blogs
async fn manage_blogs(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, blogs) =
        newest_page::<Blog>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    Ok(Reply::template(
        "manage_blogs.html",
        json!({ "page": page, "blogs": blogs }),
    ))
}

/// GET /manage/blogs/create
async fn manage_create_blog() -> Reply {
    Reply::template(
        "manage_blog_edit.html",
        json!({ "id": "", "action": "/api/blogs" }),
    )
}

/// GET /manage/blogs/edit?id=...
async fn manage_edit_blog(
    State(state): State<AppState>,
    Params(args): Params<IdArgs>,
) -> Result<Reply, ApiError> {
    let blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;
    Ok(Reply::template(
        "manage_blog_edit.html",
        json!({
            "id": blog.id(),
            "action": format!("/api/blogs/{}", blog.id()),
            "blog": blog,
        }),
    ))
}

/// GET /manage/users
async fn manage_users(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, users) =
        newest_page::<User>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    let users: Vec<User> = users.into_iter().map(User::masked).collect();
    Ok(Reply::template(
        "manage_users.html",
        json!({ "page": page, "users": users }),
    ))
}
