//! Blog model and its editable fields

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::{next_id_value, now_value};
use super::validation::bounded_text;
use super::{User, ValidationError};
use crate::orm::{Field, Model, ModelMeta, OrmError, SqlValue};

const MAX_TITLE_LEN: usize = 50;
const MAX_SUMMARY_LEN: usize = 200;
/// 64KB of body text
const MAX_CONTENT_LEN: usize = 65536;

static BLOG_META: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(
        "Blog",
        "blogs",
        vec![
            Field::string("id").ddl(50).primary_key().default_with(next_id_value),
            Field::string("user_id").ddl(50),
            Field::string("user_name").ddl(50),
            Field::string("user_image").ddl(500),
            Field::string("name").ddl(50),
            Field::string("summary").ddl(200),
            Field::text("content"),
            Field::float("created_at").default_with(now_value),
        ],
    )
    .expect("invalid Blog mapping")
});

/// Blog post, table `blogs`. Author name and avatar are denormalized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Blog {
    pub id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub name: String,
    pub summary: String,
    pub content: String,
    pub created_at: Option<f64>,
}

impl Blog {
    /// New, unsaved post authored by `author`.
    pub fn new(author: &User, name: BlogTitle, summary: BlogSummary, content: BlogContent) -> Self {
        Self {
            id: None,
            user_id: author.id().to_owned(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            name: name.0,
            summary: summary.0,
            content: content.0,
            created_at: None,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Replace the editable fields, keeping author and timestamp.
    pub fn edit(&mut self, name: BlogTitle, summary: BlogSummary, content: BlogContent) {
        self.name = name.0;
        self.summary = summary.0;
        self.content = content.0;
    }
}

impl Model for Blog {
    fn meta() -> &'static ModelMeta {
        &BLOG_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.clone().map(SqlValue::Text),
            "user_id" => Some(self.user_id.clone().into()),
            "user_name" => Some(self.user_name.clone().into()),
            "user_image" => Some(self.user_image.clone().into()),
            "name" => Some(self.name.clone().into()),
            "summary" => Some(self.summary.clone().into()),
            "content" => Some(self.content.clone().into()),
            "created_at" => self.created_at.map(SqlValue::Double),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: SqlValue) -> Result<(), OrmError> {
        match field {
            "id" => self.id = value.try_into()?,
            "user_id" => self.user_id = value.try_into()?,
            "user_name" => self.user_name = value.try_into()?,
            "user_image" => self.user_image = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "summary" => self.summary = value.try_into()?,
            "content" => self.content = value.try_into()?,
            "created_at" => self.created_at = value.try_into()?,
            other => {
                return Err(OrmError::UnknownField {
                    model: "Blog",
                    field: other.to_owned(),
                })
            }
        }
        Ok(())
    }
}

/// Validated blog title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogTitle(String);

impl BlogTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(s, "name", MAX_TITLE_LEN).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogSummary(String);

impl BlogSummary {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(s, "summary", MAX_SUMMARY_LEN).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogContent(String);

impl BlogContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(s, "content", MAX_CONTENT_LEN).map(Self)
    }
}
