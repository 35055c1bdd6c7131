//! Route handlers organized by resource

pub mod blogs;
pub mod comments;
pub mod health;
pub mod pages;
pub mod users;

use serde::Deserialize;

use super::error::ApiError;
use super::shim::{lenient_string, Arguments, Routes};
use crate::models::{page_index_arg, Page};
use crate::orm::{Database, FindAll, Model};
use crate::state::AppState;

/// The whole route table.
pub fn table() -> Routes<AppState> {
    Routes::new()
        .merge(health::routes())
        .merge(pages::routes())
        .merge(users::routes())
        .merge(blogs::routes())
        .merge(comments::routes())
}

/// `?page=N` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageArgs {
    #[serde(default, deserialize_with = "lenient_string")]
    pub page: Option<String>,
}

impl Arguments for PageArgs {}

/// A single resource addressed by id, usually from the path
#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

impl Arguments for IdArgs {
    const REQUIRED: &'static [&'static str] = &["id"];
}

/// One page of `M`, newest first.
pub(crate) async fn newest_page<M: Model>(
    db: &Database,
    page: Option<&str>,
    page_size: u32,
) -> Result<(Page, Vec<M>), ApiError> {
    let index = page_index_arg(page);
    let count_expr = format!("count(\"{}\")", M::meta().primary_key);
    let count = db.find_number::<M>(&count_expr, None, &[]).await?.unwrap_or(0);
    let page = Page::new(u64::try_from(count).unwrap_or(0), index, page_size);
    if page.is_empty() {
        return Ok((page, Vec::new()));
    }

    let query = FindAll::new()
        .order_by("\"created_at\" desc")
        .range(page.offset, page.limit);
    let items = db.find_all::<M>(query).await?;
    Ok((page, items))
}

/// Fetch by id or fail with a 404 naming the resource.
pub(crate) async fn find_or_404<M: Model>(
    db: &Database,
    resource: &'static str,
    id: &str,
) -> Result<M, ApiError> {
    db.find::<M>(id).await?.ok_or_else(|| ApiError::not_found(resource))
}
