//! Comment API

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use super::{find_or_404, newest_page, IdArgs, PageArgs};
use crate::http::error::ApiError;
use crate::http::middleware::CurrentUser;
use crate::http::reply::Reply;
use crate::http::shim::{Arguments, Params, Routes};
use crate::models::{Blog, Comment, CommentContent};
use crate::state::AppState;

pub fn routes() -> Routes<AppState> {
    Routes::new()
        .get("/api/comments", "api_comments", api_comments)
        .post("/api/blogs/{id}/comments", "api_create_comment", api_create_comment)
        .post("/api/comments/{id}/delete", "api_delete_comment", api_delete_comment)
}

#[derive(Debug, Deserialize)]
struct CreateCommentArgs {
    /// Blog id, from the path
    id: String,
    content: String,
    #[serde(default)]
    parent_id: Option<String>,
}

impl Arguments for CreateCommentArgs {
    const REQUIRED: &'static [&'static str] = &["id", "content"];
}

/// GET /api/comments
async fn api_comments(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, comments) =
        newest_page::<Comment>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    Ok(Reply::Json(json!({ "page": page, "comments": comments })))
}

/// POST /api/blogs/{id}/comments (signed in)
async fn api_create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<CreateCommentArgs>,
) -> Result<Reply, ApiError> {
    let author = current.require_user()?;
    let blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;
    let content = CommentContent::new(&args.content)?;

    let parent = match args.parent_id.as_deref().filter(|p| !p.is_empty()) {
        Some(parent_id) => Some(find_or_404::<Comment>(state.db(), "Comment", parent_id).await?),
        None => None,
    };

    let mut comment = Comment::new(&blog, author, content, parent.as_ref())?;
    state.db().save(&mut comment).await?;
    Reply::json(&comment)
}

/// POST /api/comments/{id}/delete (admin)
///
/// Replies stay; with their parent gone they show as top-level comments.
async fn api_delete_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<IdArgs>,
) -> Result<Reply, ApiError> {
    current.require_admin()?;
    let comment: Comment = find_or_404(state.db(), "Comment", &args.id).await?;
    state.db().remove(&comment).await?;
    Ok(Reply::Json(json!({ "id": comment.id() })))
}
