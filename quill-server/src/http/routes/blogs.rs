//! Blog API

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use super::{find_or_404, newest_page, IdArgs, PageArgs};
use crate::http::error::ApiError;
use crate::http::middleware::CurrentUser;
use crate::http::reply::Reply;
use crate::http::shim::{Arguments, Params, Routes};
use crate::models::{Blog, BlogContent, BlogSummary, BlogTitle, Comment};
use crate::orm::{Model, SqlValue};
use crate::state::AppState;

pub fn routes() -> Routes<AppState> {
    Routes::new()
        .get("/api/blogs", "api_blogs", api_blogs)
        .post("/api/blogs", "api_create_blog", api_create_blog)
        .get("/api/blogs/{id}", "api_get_blog", api_get_blog)
        .post("/api/blogs/{id}", "api_update_blog", api_update_blog)
        .post("/api/blogs/{id}/delete", "api_delete_blog", api_delete_blog)
}

#[derive(Debug, Deserialize)]
struct BlogArgs {
    name: String,
    summary: String,
    content: String,
}

impl Arguments for BlogArgs {
    const REQUIRED: &'static [&'static str] = &["name", "summary", "content"];
}

impl BlogArgs {
    fn validate(&self) -> Result<(BlogTitle, BlogSummary, BlogContent), ApiError> {
        Ok((
            BlogTitle::new(&self.name)?,
            BlogSummary::new(&self.summary)?,
            BlogContent::new(&self.content)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct UpdateBlogArgs {
    id: String,
    #[serde(flatten)]
    blog: BlogArgs,
}

impl Arguments for UpdateBlogArgs {
    const REQUIRED: &'static [&'static str] = &["id", "name", "summary", "content"];
}

/// GET /api/blogs
async fn api_blogs(
    State(state): State<AppState>,
    Params(args): Params<PageArgs>,
) -> Result<Reply, ApiError> {
    let (page, blogs) =
        newest_page::<Blog>(state.db(), args.page.as_deref(), state.site().page_size).await?;
    Ok(Reply::Json(json!({ "page": page, "blogs": blogs })))
}

/// GET /api/blogs/{id}
async fn api_get_blog(
    State(state): State<AppState>,
    Params(args): Params<IdArgs>,
) -> Result<Reply, ApiError> {
    let blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;
    Reply::json(&blog)
}

/// POST /api/blogs (admin)
async fn api_create_blog(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<BlogArgs>,
) -> Result<Reply, ApiError> {
    let author = current.require_admin()?;
    let (name, summary, content) = args.validate()?;

    let mut blog = Blog::new(author, name, summary, content);
    state.db().save(&mut blog).await?;
    Reply::json(&blog)
}

/// POST /api/blogs/{id} (admin)
async fn api_update_blog(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<UpdateBlogArgs>,
) -> Result<Reply, ApiError> {
    current.require_admin()?;
    let mut blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;
    let (name, summary, content) = args.blog.validate()?;

    blog.edit(name, summary, content);
    state.db().update(&blog).await?;
    Reply::json(&blog)
}

/// POST /api/blogs/{id}/delete (admin) - the blog and all its comments
async fn api_delete_blog(
    State(state): State<AppState>,
    current: CurrentUser,
    Params(args): Params<IdArgs>,
) -> Result<Reply, ApiError> {
    current.require_admin()?;
    let blog: Blog = find_or_404(state.db(), "Blog", &args.id).await?;

    let id = SqlValue::from(blog.id());
    let statements = vec![
        (
            format!("delete from \"{}\" where \"blog_id\"=?", Comment::meta().table),
            vec![id.clone()],
        ),
        (Blog::meta().delete.clone(), vec![id]),
    ];
    let removed = state.db().transaction(&statements).await?;
    tracing::info!("deleted blog {} ({} rows)", blog.id(), removed);

    Ok(Reply::Json(json!({ "id": blog.id() })))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::QuillConfig;
    use crate::db::{create_pool, migrations};
    use crate::http::server::{build_router, ServerConfig};
    use crate::models::{next_id, BlogContent, BlogSummary, BlogTitle, CommentContent, User};
    use crate::orm::Database;
    use crate::state::AppState;

    use super::*;

    // DATABASE_URL=postgres://... cargo test -p quill-server -- --ignored

    async fn state() -> AppState {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        AppState::new(Database::new(pool), &QuillConfig::default())
    }

    fn admin() -> User {
        let id = next_id();
        User {
            email: format!("{}@quill.test", &id[15..40]),
            id: Some(id),
            passwd: "stored-digest".into(),
            admin: true,
            name: "Admin".into(),
            image: String::new(),
            created_at: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_removes_comments_with_blog() {
        let state = state().await;
        let db = state.db().clone();

        let mut user = admin();
        db.save(&mut user).await.unwrap();
        let mut blog = Blog::new(
            &user,
            BlogTitle::new("doomed").unwrap(),
            BlogSummary::new("s").unwrap(),
            BlogContent::new("c").unwrap(),
        );
        db.save(&mut blog).await.unwrap();
        let mut first = Comment::new(&blog, &user, CommentContent::new("one").unwrap(), None).unwrap();
        db.save(&mut first).await.unwrap();
        let mut reply =
            Comment::new(&blog, &user, CommentContent::new("two").unwrap(), Some(&first)).unwrap();
        db.save(&mut reply).await.unwrap();

        let token = state.signer().issue(&user, chrono::Utc::now().timestamp());
        let response = build_router(state.clone(), &ServerConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/blogs/{}/delete", blog.id()))
                    .header(CONTENT_TYPE, "application/json")
                    .header(COOKIE, format!("{}={}", state.signer().cookie_name(), token))
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert!(db.find::<Blog>(blog.id()).await.unwrap().is_none());
        let left = db
            .find_number::<Comment>("count(\"id\")", Some("\"blog_id\"=?"), &[blog.id().into()])
            .await
            .unwrap();
        assert_eq!(left, Some(0));

        db.remove(&user).await.unwrap();
    }
}
