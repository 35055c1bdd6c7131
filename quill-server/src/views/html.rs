//! Shared layout and page fragments

use super::filters::escape;
use super::RenderEnv;
use crate::models::Page;

/// Client glue: password hashing, JSON form posts, delete buttons.
///
/// The password field never leaves the browser in clear; it is sent as
/// sha256(lowercased email + ":" + password) in hex.
const SCRIPT: &str = r#"
async function sha256hex(text) {
  const buf = await crypto.subtle.digest('SHA-256', new TextEncoder().encode(text));
  return Array.from(new Uint8Array(buf)).map(b => b.toString(16).padStart(2, '0')).join('');
}
async function postJSON(url, data) {
  const r = await fetch(url, {method: 'POST', headers: {'Content-Type': 'application/json'}, body: JSON.stringify(data)});
  const body = await r.json().catch(() => ({}));
  if (!r.ok || body.error) { throw body; }
  return body;
}
function showError(form, e) {
  const el = form.querySelector('.error');
  if (el) { el.textContent = (e && e.message) || 'Request failed.'; }
}
document.addEventListener('submit', async ev => {
  const form = ev.target;
  if (!form.dataset.api) { return; }
  ev.preventDefault();
  const data = Object.fromEntries(new FormData(form));
  if (data.passwd !== undefined) {
    if (data.passwd2 !== undefined && data.passwd !== data.passwd2) {
      showError(form, {message: 'Passwords do not match.'});
      return;
    }
    data.passwd = await sha256hex(data.email.trim().toLowerCase() + ':' + data.passwd);
    delete data.passwd2;
  }
  try {
    await postJSON(form.dataset.api, data);
    location.assign(form.dataset.next || '/');
  } catch (e) {
    showError(form, e);
  }
});
document.addEventListener('click', async ev => {
  const button = ev.target.closest('[data-delete]');
  if (!button || !confirm('Delete ' + (button.dataset.label || 'this item') + '?')) { return; }
  try {
    await postJSON(button.dataset.delete, {});
    location.reload();
  } catch (e) {
    alert((e && e.message) || 'Delete failed.');
  }
});
"#;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 60rem; margin: 0 auto; padding: 0 1rem; }
nav { display: flex; gap: 1rem; align-items: center; border-bottom: 1px solid #ddd; padding: .5rem 0; }
nav .spacer { flex: 1; }
article { border-bottom: 1px solid #eee; padding: 1rem 0; }
.meta { color: #888; font-size: .85rem; }
.error { color: #c00; }
.replies { margin-left: 2rem; border-left: 2px solid #eee; padding-left: 1rem; }
table { width: 100%; border-collapse: collapse; }
td, th { text-align: left; padding: .25rem .5rem; border-bottom: 1px solid #eee; }
textarea, input[type=text], input[type=email], input[type=password] { width: 100%; }
"#;

fn nav(env: &RenderEnv) -> String {
    let mut links = vec![format!(r#"<a href="/"><strong>{}</strong></a>"#, escape(env.site_title))];
    links.push(r#"<span class="spacer"></span>"#.to_string());

    match env.user {
        Some(user) => {
            if user.admin {
                links.push(r#"<a href="/manage/">Manage</a>"#.to_string());
            }
            links.push(format!(
                r#"<img src="{}" width="24" height="24" alt=""> <span>{}</span>"#,
                escape(&user.image),
                escape(&user.name)
            ));
            links.push(r#"<a href="/signout">Sign out</a>"#.to_string());
        }
        None => {
            links.push(r#"<a href="/signin">Sign in</a>"#.to_string());
            links.push(r#"<a href="/register">Register</a>"#.to_string());
        }
    }

    format!("<nav>{}</nav>", links.join("\n"))
}

/// Full document around `body`.
pub fn layout(env: &RenderEnv, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title} - {site}</title>
<style>{style}</style>
</head>
<body>
{nav}
<main>
{body}
</main>
<script>{script}</script>
</body>
</html>
"#,
        title = escape(title),
        site = escape(env.site_title),
        style = STYLE,
        nav = nav(env),
        body = body,
        script = SCRIPT,
    )
}

/// Previous/next links for a paged list at `base`.
pub fn pagination(page: &Page, base: &str) -> String {
    if page.page_count <= 1 {
        return String::new();
    }

    let mut out = String::from(r#"<p class="pagination">"#);
    if page.has_previous {
        out.push_str(&format!(
            r#"<a href="{}?page={}">&laquo; Newer</a> "#,
            base,
            page.page_index - 1
        ));
    }
    out.push_str(&format!(
        "<span>Page {} of {}</span>",
        page.page_index, page.page_count
    ));
    if page.has_next {
        out.push_str(&format!(
            r#" <a href="{}?page={}">Older &raquo;</a>"#,
            base,
            page.page_index + 1
        ));
    }
    out.push_str("</p>");
    out
}

/// Submit form posting JSON to `api`, then following `next`.
pub fn api_form(api: &str, next: &str, fields: &str, submit: &str) -> String {
    format!(
        r#"<form data-api="{}" data-next="{}">
{}
<p class="error"></p>
<button type="submit">{}</button>
</form>"#,
        escape(api),
        escape(next),
        fields,
        escape(submit)
    )
}

/// Button that posts to a delete endpoint and reloads.
pub fn delete_button(api: &str, label: &str) -> String {
    format!(
        r#"<button type="button" data-delete="{}" data-label="{}">Delete</button>"#,
        escape(api),
        escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn env(user: Option<&User>) -> RenderEnv<'_> {
        RenderEnv {
            site_title: "Quill",
            user,
            now: 0.0,
        }
    }

    #[test]
    fn anonymous_nav_offers_sign_in() {
        let html = layout(&env(None), "Home", "<p>x</p>");
        assert!(html.contains(r#"href="/signin""#));
        assert!(html.contains(r#"href="/register""#));
        assert!(!html.contains("/manage/"));
        assert!(html.contains("<title>Home - Quill</title>"));
    }

    #[test]
    fn admin_nav_links_manage() {
        let user = User {
            id: Some("u".into()),
            email: "a@b.co".into(),
            passwd: "******".into(),
            admin: true,
            name: "<Ann>".into(),
            image: "https://img".into(),
            created_at: None,
        };
        let html = layout(&env(Some(&user)), "Home", "");
        assert!(html.contains(r#"href="/manage/""#));
        assert!(html.contains("&lt;Ann&gt;"));
        assert!(html.contains("/signout"));
    }

    #[test]
    fn pagination_links() {
        assert_eq!(pagination(&Page::new(5, 1, 10), "/"), "");
        let html = pagination(&Page::new(25, 2, 10), "/manage/blogs");
        assert!(html.contains(r#"href="/manage/blogs?page=1""#));
        assert!(html.contains(r#"href="/manage/blogs?page=3""#));
        assert!(html.contains("Page 2 of 3"));
    }
}
