//! Server-rendered HTML
//!
//! Handlers hand over a template name and a JSON context; [`render`] checks
//! the context against the page's typed struct and builds the document.

pub mod filters;
mod html;
mod pages;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::User;

pub use filters::{datetime_filter, escape, text_to_html};

/// Every template [`render`] knows.
pub const TEMPLATES: &[&str] = &[
    "blogs.html",
    "blog.html",
    "register.html",
    "signin.html",
    "manage_blogs.html",
    "manage_blog_edit.html",
    "manage_comments.html",
    "manage_users.html",
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("invalid context for {template}: {source}")]
    Context {
        template: &'static str,
        source: serde_json::Error,
    },
}

/// Values every page sees besides its own context
#[derive(Debug, Clone, Copy)]
pub struct RenderEnv<'a> {
    pub site_title: &'a str,
    pub user: Option<&'a User>,
    /// Reference time for relative dates, epoch seconds
    pub now: f64,
}

fn context<T: DeserializeOwned>(template: &'static str, value: Value) -> Result<T, RenderError> {
    serde_json::from_value(value).map_err(|source| RenderError::Context { template, source })
}

pub fn render(name: &str, ctx: Value, env: &RenderEnv) -> Result<String, RenderError> {
    tracing::debug!("render template {}", name);
    let html = match name {
        "blogs.html" => pages::blogs(context("blogs.html", ctx)?, env),
        "blog.html" => pages::blog(context("blog.html", ctx)?, env),
        "register.html" => pages::register(env),
        "signin.html" => pages::signin(env),
        "manage_blogs.html" => pages::manage_blogs(context("manage_blogs.html", ctx)?, env),
        "manage_blog_edit.html" => {
            pages::manage_blog_edit(context("manage_blog_edit.html", ctx)?, env)
        }
        "manage_comments.html" => {
            pages::manage_comments(context("manage_comments.html", ctx)?, env)
        }
        "manage_users.html" => pages::manage_users(context("manage_users.html", ctx)?, env),
        other => return Err(RenderError::UnknownTemplate(other.to_string())),
    };
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{thread_comments, Blog, Comment, Page};
    use serde_json::json;

    const NOW: f64 = 1_700_000_000.0;

    fn env(user: Option<&User>) -> RenderEnv<'_> {
        RenderEnv {
            site_title: "Quill",
            user,
            now: NOW,
        }
    }

    fn reader() -> User {
        User {
            id: Some("u1".into()),
            email: "r@b.co".into(),
            passwd: "******".into(),
            admin: false,
            name: "Reader".into(),
            image: String::new(),
            created_at: Some(NOW),
        }
    }

    fn blog() -> Blog {
        Blog {
            id: Some("b1".into()),
            user_id: "u0".into(),
            user_name: "Author".into(),
            user_image: String::new(),
            name: "Hello <world>".into(),
            summary: "short".into(),
            content: "line one\n\nline two".into(),
            created_at: Some(NOW - 7200.0),
        }
    }

    fn comment(id: &str, parent: Option<&str>, content: &str) -> Comment {
        Comment {
            id: Some(id.into()),
            blog_id: "b1".into(),
            user_id: "u1".into(),
            user_name: "Reader".into(),
            user_image: String::new(),
            parent_id: parent.map(Into::into),
            content: content.into(),
            created_at: Some(NOW - 30.0),
        }
    }

    #[test]
    fn every_template_name_is_known() {
        for name in TEMPLATES {
            let err = render(name, json!(null), &env(None));
            assert!(!matches!(err, Err(RenderError::UnknownTemplate(_))), "{}", name);
        }
    }

    #[test]
    fn unknown_template() {
        let err = render("test.html", json!({}), &env(None)).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(ref n) if n == "test.html"));
    }

    #[test]
    fn wrong_context_is_an_error() {
        let err = render("blogs.html", json!({"blogs": 3}), &env(None)).unwrap_err();
        assert!(matches!(err, RenderError::Context { template: "blogs.html", .. }));
    }

    #[test]
    fn blog_list_escapes_and_paginates() {
        let ctx = json!({"page": Page::new(25, 1, 10), "blogs": [blog()]});
        let html = render("blogs.html", ctx, &env(None)).unwrap();
        assert!(html.contains("Hello &lt;world&gt;"));
        assert!(html.contains("2 hours ago"));
        assert!(html.contains(r#"href="/?page=2""#));
    }

    #[test]
    fn blog_page_threads_comments() {
        let comments = thread_comments(vec![
            comment("c1", None, "first"),
            comment("c2", Some("c1"), "a reply"),
        ]);
        let ctx = json!({"blog": blog(), "comments": comments});
        let html = render("blog.html", ctx, &env(None)).unwrap();
        assert!(html.contains("<p>line one</p><p>line two</p>"));
        assert!(html.contains(r#"<div class="replies">"#));
        assert!(html.contains("a reply"));
        assert!(html.contains("to comment."));
    }

    #[test]
    fn signed_in_reader_can_reply() {
        let user = reader();
        let ctx = json!({"blog": blog(), "comments": thread_comments(vec![comment("c1", None, "x")])});
        let html = render("blog.html", ctx, &env(Some(&user))).unwrap();
        assert!(html.contains(r#"data-api="/api/blogs/b1/comments""#));
        assert!(html.contains(r#"name="parent_id" value="c1""#));
    }

    #[test]
    fn edit_form_prefills() {
        let ctx = json!({"id": "b1", "action": "/api/blogs/b1", "blog": blog()});
        let html = render("manage_blog_edit.html", ctx, &env(None)).unwrap();
        assert!(html.contains("Edit blog"));
        assert!(html.contains(r#"data-api="/api/blogs/b1""#));
        assert!(html.contains("line one"));

        let create = render(
            "manage_blog_edit.html",
            json!({"action": "/api/blogs"}),
            &env(None),
        )
        .unwrap();
        assert!(create.contains("New blog"));
    }

    #[test]
    fn user_table_never_shows_digest() {
        let ctx = json!({"page": Page::new(1, 1, 10), "users": [reader()]});
        let html = render("manage_users.html", ctx, &env(None)).unwrap();
        assert!(html.contains("r@b.co"));
        assert!(!html.contains("******"));
    }

    #[test]
    fn long_reply_chain_renders_on_worker_stack() {
        const CHAIN: usize = 10_000;
        // tokio worker threads get 2 MiB
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let mut chain = vec![comment("c0", None, "start")];
                for i in 1..CHAIN {
                    let parent = format!("c{}", i - 1);
                    chain.push(comment(&format!("c{}", i), Some(&parent), "again"));
                }
                let ctx = json!({"blog": blog(), "comments": thread_comments(chain)});
                render("blog.html", ctx, &env(None)).unwrap()
            })
            .unwrap();

        let html = handle.join().expect("rendering overflowed the stack");
        assert!(html.contains(r#"id="comment-c9999""#));
        let nesting = html.matches(r#"<div class="replies">"#).count();
        assert_eq!(nesting, crate::models::MAX_REPLY_DEPTH);
    }
}
