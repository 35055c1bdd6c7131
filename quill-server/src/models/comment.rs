//! Comment model and reply threading

use std::collections::{HashMap, VecDeque};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::{next_id_value, now_value};
use super::validation::bounded_text;
use super::{Blog, User, ValidationError};
use crate::orm::{Field, Model, ModelMeta, OrmError, SqlValue};

const MAX_CONTENT_LEN: usize = 65536;

static COMMENT_META: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new(
        "Comment",
        "comments",
        vec![
            Field::string("id").ddl(50).primary_key().default_with(next_id_value),
            Field::string("blog_id").ddl(50),
            Field::string("user_id").ddl(50),
            Field::string("user_name").ddl(50),
            Field::string("user_image").ddl(500),
            Field::string("parent_id").ddl(50).nullable(),
            Field::text("content"),
            Field::float("created_at").default_with(now_value),
        ],
    )
    .expect("invalid Comment mapping")
});

/// Comment on a blog, table `comments`. `parent_id` links replies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Option<String>,
    pub blog_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_image: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: Option<f64>,
}

impl Comment {
    /// New, unsaved comment. A reply's parent must sit on the same blog.
    pub fn new(
        blog: &Blog,
        author: &User,
        content: CommentContent,
        parent: Option<&Comment>,
    ) -> Result<Self, ValidationError> {
        if let Some(parent) = parent {
            if parent.blog_id != blog.id() {
                return Err(ValidationError::InvalidVariant {
                    field: "parent_id",
                    value: parent.id().to_owned(),
                });
            }
        }

        Ok(Self {
            id: None,
            blog_id: blog.id().to_owned(),
            user_id: author.id().to_owned(),
            user_name: author.name.clone(),
            user_image: author.image.clone(),
            parent_id: parent.map(|p| p.id().to_owned()),
            content: content.0,
            created_at: None,
        })
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Model for Comment {
    fn meta() -> &'static ModelMeta {
        &COMMENT_META
    }

    fn value(&self, field: &str) -> Option<SqlValue> {
        match field {
            "id" => self.id.clone().map(SqlValue::Text),
            "blog_id" => Some(self.blog_id.clone().into()),
            "user_id" => Some(self.user_id.clone().into()),
            "user_name" => Some(self.user_name.clone().into()),
            "user_image" => Some(self.user_image.clone().into()),
            "parent_id" => self.parent_id.clone().map(SqlValue::Text),
            "content" => Some(self.content.clone().into()),
            "created_at" => self.created_at.map(SqlValue::Double),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &str, value: SqlValue) -> Result<(), OrmError> {
        match field {
            "id" => self.id = value.try_into()?,
            "blog_id" => self.blog_id = value.try_into()?,
            "user_id" => self.user_id = value.try_into()?,
            "user_name" => self.user_name = value.try_into()?,
            "user_image" => self.user_image = value.try_into()?,
            "parent_id" => self.parent_id = value.try_into()?,
            "content" => self.content = value.try_into()?,
            "created_at" => self.created_at = value.try_into()?,
            other => {
                return Err(OrmError::UnknownField {
                    model: "Comment",
                    field: other.to_owned(),
                })
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(s, "content", MAX_CONTENT_LEN).map(Self)
    }
}

/// A comment with its replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Replies nest at most this many levels below a top-level comment.
/// Deeper replies are listed alongside their parent.
pub const MAX_REPLY_DEPTH: usize = 8;

/// Arrange a flat comment list into reply trees.
///
/// Sibling order follows the input order. Replies whose parent is not in
/// the list are promoted to roots, as is one member of any parent cycle.
/// Nesting stops at [`MAX_REPLY_DEPTH`], so the tree stays shallow however
/// long a reply chain grows.
pub fn thread_comments(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (i, c) in comments.iter().enumerate() {
        index.entry(c.id()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut has_parent = vec![false; comments.len()];
    for (i, c) in comments.iter().enumerate() {
        if let Some(&p) = c.parent_id.as_deref().and_then(|pid| index.get(pid)) {
            if p != i {
                children[p].push(i);
                has_parent[i] = true;
            }
        }
    }

    // Breadth-first walk. `anchor[i]` is the node i is displayed under.
    let mut depth = vec![0usize; comments.len()];
    let mut anchor: Vec<Option<usize>> = vec![None; comments.len()];
    let mut visited = vec![false; comments.len()];
    let mut shown: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    let mut queue = VecDeque::new();

    let starts = (0..comments.len())
        .filter(|&i| !has_parent[i])
        .chain(0..comments.len());
    for start in starts {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        roots.push(start);
        queue.push_back(start);

        while let Some(p) = queue.pop_front() {
            for &c in &children[p] {
                if visited[c] {
                    continue;
                }
                visited[c] = true;
                let a = match anchor[p] {
                    Some(up) if depth[p] >= MAX_REPLY_DEPTH => up,
                    _ => p,
                };
                anchor[c] = Some(a);
                depth[c] = depth[a] + 1;
                shown[a].push(c);
                queue.push_back(c);
            }
        }
    }

    roots.sort_unstable();
    for list in &mut shown {
        list.sort_unstable();
    }

    fn build(i: usize, slots: &mut [Option<Comment>], shown: &[Vec<usize>]) -> Option<CommentNode> {
        let comment = slots[i].take()?;
        let replies = shown[i]
            .iter()
            .filter_map(|&c| build(c, slots, shown))
            .collect();
        Some(CommentNode { comment, replies })
    }

    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|i| build(i, &mut slots, &shown))
        .collect()
}
