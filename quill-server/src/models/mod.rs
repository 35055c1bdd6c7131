//! Domain models with validation at construction
//!
//! `User`, `Blog` and `Comment` are ORM models; the newtypes here validate
//! user input before it reaches them. Invalid input returns
//! ValidationError, not panic.

pub mod blog;
pub mod comment;
pub mod id;
pub mod pagination;
pub mod user;
pub mod validation;

pub use blog::{Blog, BlogContent, BlogSummary, BlogTitle};
pub use comment::{thread_comments, Comment, CommentContent, CommentNode, MAX_REPLY_DEPTH};
pub use id::{next_id, now_ts};
pub use pagination::{page_index_arg, Page, DEFAULT_PAGE_SIZE};
pub use user::{gravatar_url, DisplayName, Email, PasswordDigest, User, MASKED_PASSWD};
pub use validation::ValidationError;
