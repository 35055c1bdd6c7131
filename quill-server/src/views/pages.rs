//! One renderer per template name

use serde::Deserialize;

use super::filters::{datetime_filter, escape, text_to_html};
use super::html::{api_form, delete_button, layout, pagination};
use super::RenderEnv;
use crate::models::{Blog, Comment, CommentNode, Page, User};

#[derive(Debug, Deserialize)]
pub struct BlogsContext {
    pub page: Page,
    pub blogs: Vec<Blog>,
}

#[derive(Debug, Deserialize)]
pub struct BlogContext {
    pub blog: Blog,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Deserialize)]
pub struct BlogEditContext {
    /// Empty when creating
    #[serde(default)]
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub blog: Option<Blog>,
}

#[derive(Debug, Deserialize)]
pub struct CommentsContext {
    pub page: Page,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct UsersContext {
    pub page: Page,
    pub users: Vec<User>,
}

fn when(created_at: Option<f64>, env: &RenderEnv) -> String {
    created_at
        .map(|ts| datetime_filter(ts, env.now))
        .unwrap_or_default()
}

pub fn blogs(ctx: BlogsContext, env: &RenderEnv) -> String {
    let mut body = String::new();
    if ctx.blogs.is_empty() {
        body.push_str("<p>Nothing published yet.</p>");
    }
    for blog in &ctx.blogs {
        body.push_str(&format!(
            r#"<article>
<h2><a href="/blog/{id}">{name}</a></h2>
<p class="meta">by {author}, {when}</p>
<p>{summary}</p>
<p><a href="/blog/{id}">Read more</a></p>
</article>
"#,
            id = escape(blog.id()),
            name = escape(&blog.name),
            author = escape(&blog.user_name),
            when = when(blog.created_at, env),
            summary = escape(&blog.summary),
        ));
    }
    body.push_str(&pagination(&ctx.page, "/"));
    layout(env, "Blogs", &body)
}

fn comment_tree(nodes: &[CommentNode], blog_id: &str, env: &RenderEnv, out: &mut String) {
    for node in nodes {
        let c = &node.comment;
        out.push_str(&format!(
            r#"<div class="comment" id="comment-{id}">
<p class="meta"><img src="{image}" width="20" height="20" alt=""> {author}, {when}</p>
{content}
"#,
            id = escape(c.id()),
            image = escape(&c.user_image),
            author = escape(&c.user_name),
            when = when(c.created_at, env),
            content = text_to_html(&c.content),
        ));
        if env.user.is_some() {
            let fields = format!(
                r#"<input type="hidden" name="parent_id" value="{}">
<textarea name="content" rows="3"></textarea>"#,
                escape(c.id())
            );
            out.push_str(&format!(
                "<details><summary>Reply</summary>\n{}\n</details>\n",
                api_form(
                    &format!("/api/blogs/{}/comments", blog_id),
                    &format!("/blog/{}", blog_id),
                    &fields,
                    "Reply",
                )
            ));
        }
        if !node.replies.is_empty() {
            out.push_str(r#"<div class="replies">"#);
            comment_tree(&node.replies, blog_id, env, out);
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }
}

pub fn blog(ctx: BlogContext, env: &RenderEnv) -> String {
    let blog = &ctx.blog;
    let mut body = format!(
        r#"<article>
<h1>{name}</h1>
<p class="meta">by {author}, {when}</p>
{content}
</article>
<h3>Comments</h3>
"#,
        name = escape(&blog.name),
        author = escape(&blog.user_name),
        when = when(blog.created_at, env),
        content = text_to_html(&blog.content),
    );

    if ctx.comments.is_empty() {
        body.push_str("<p>No comments yet.</p>\n");
    }
    comment_tree(&ctx.comments, blog.id(), env, &mut body);

    match env.user {
        Some(_) => body.push_str(&api_form(
            &format!("/api/blogs/{}/comments", blog.id()),
            &format!("/blog/{}", blog.id()),
            r#"<textarea name="content" rows="5"></textarea>"#,
            "Post comment",
        )),
        None => body.push_str(r#"<p><a href="/signin">Sign in</a> to comment.</p>"#),
    }

    layout(env, &blog.name, &body)
}

pub fn register(env: &RenderEnv) -> String {
    let fields = r#"<p><label>Name <input type="text" name="name" maxlength="50"></label></p>
<p><label>Email <input type="email" name="email" maxlength="50"></label></p>
<p><label>Password <input type="password" name="passwd"></label></p>
<p><label>Repeat password <input type="password" name="passwd2"></label></p>"#;
    let body = format!(
        "<h1>Register</h1>\n{}",
        api_form("/api/users", "/", fields, "Register")
    );
    layout(env, "Register", &body)
}

pub fn signin(env: &RenderEnv) -> String {
    let fields = r#"<p><label>Email <input type="email" name="email"></label></p>
<p><label>Password <input type="password" name="passwd"></label></p>"#;
    let body = format!(
        "<h1>Sign in</h1>\n{}",
        api_form("/api/authenticate", "/", fields, "Sign in")
    );
    layout(env, "Sign in", &body)
}

fn manage_tabs() -> &'static str {
    r#"<p><a href="/manage/comments">Comments</a> | <a href="/manage/blogs">Blogs</a> | <a href="/manage/users">Users</a></p>"#
}

pub fn manage_blogs(ctx: BlogsContext, env: &RenderEnv) -> String {
    let mut rows = String::new();
    for blog in &ctx.blogs {
        rows.push_str(&format!(
            r#"<tr><td><a href="/blog/{id}">{name}</a></td><td>{author}</td><td>{when}</td>
<td><a href="/manage/blogs/edit?id={id}">Edit</a> {delete}</td></tr>
"#,
            id = escape(blog.id()),
            name = escape(&blog.name),
            author = escape(&blog.user_name),
            when = when(blog.created_at, env),
            delete = delete_button(&format!("/api/blogs/{}/delete", blog.id()), &blog.name),
        ));
    }
    let body = format!(
        r#"{tabs}
<p><a href="/manage/blogs/create">New blog</a></p>
<table><tr><th>Title</th><th>Author</th><th>Created</th><th></th></tr>
{rows}</table>
{pages}"#,
        tabs = manage_tabs(),
        rows = rows,
        pages = pagination(&ctx.page, "/manage/blogs"),
    );
    layout(env, "Manage blogs", &body)
}

pub fn manage_blog_edit(ctx: BlogEditContext, env: &RenderEnv) -> String {
    let (name, summary, content) = ctx
        .blog
        .as_ref()
        .map(|b| (b.name.as_str(), b.summary.as_str(), b.content.as_str()))
        .unwrap_or_default();
    let fields = format!(
        r#"<p><label>Title <input type="text" name="name" maxlength="50" value="{}"></label></p>
<p><label>Summary <textarea name="summary" rows="3" maxlength="200">{}</textarea></label></p>
<p><label>Content <textarea name="content" rows="16">{}</textarea></label></p>"#,
        escape(name),
        escape(summary),
        escape(content)
    );
    let title = if ctx.id.is_empty() { "New blog" } else { "Edit blog" };
    let body = format!(
        "{}\n<h1>{}</h1>\n{}",
        manage_tabs(),
        title,
        api_form(&ctx.action, "/manage/blogs", &fields, "Save")
    );
    layout(env, title, &body)
}

pub fn manage_comments(ctx: CommentsContext, env: &RenderEnv) -> String {
    let mut rows = String::new();
    for comment in &ctx.comments {
        rows.push_str(&format!(
            r#"<tr><td>{content}</td><td>{author}</td><td>{when}</td>
<td><a href="/blog/{blog}#comment-{id}">View</a> {delete}</td></tr>
"#,
            content = escape(&comment.content),
            author = escape(&comment.user_name),
            when = when(comment.created_at, env),
            blog = escape(&comment.blog_id),
            id = escape(comment.id()),
            delete = delete_button(&format!("/api/comments/{}/delete", comment.id()), "comment"),
        ));
    }
    let body = format!(
        r#"{tabs}
<table><tr><th>Comment</th><th>Author</th><th>Created</th><th></th></tr>
{rows}</table>
{pages}"#,
        tabs = manage_tabs(),
        rows = rows,
        pages = pagination(&ctx.page, "/manage/comments"),
    );
    layout(env, "Manage comments", &body)
}

pub fn manage_users(ctx: UsersContext, env: &RenderEnv) -> String {
    let mut rows = String::new();
    for user in &ctx.users {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&user.name),
            escape(&user.email),
            if user.admin { "admin" } else { "" },
            when(user.created_at, env),
        ));
    }
    let body = format!(
        r#"{tabs}
<table><tr><th>Name</th><th>Email</th><th>Role</th><th>Registered</th></tr>
{rows}</table>
{pages}"#,
        tabs = manage_tabs(),
        rows = rows,
        pages = pagination(&ctx.page, "/manage/users"),
    );
    layout(env, "Manage users", &body)
}
