//! Shared markup helpers for the server-rendered pages.

use std::fmt::Write;

use axum::response::Html;

use crate::auth::AuthUser;

const PAGE_CSS: &str = "body{margin:0;font-family:system-ui,sans-serif;color:#111827;background:#f9fafb}\
nav{display:flex;gap:16px;align-items:center;padding:12px 24px;background:#111827}\
nav a,nav button{color:#f9fafb;text-decoration:none;background:none;border:none;font:inherit;cursor:pointer}\
nav .spacer{flex:1}\
main{max-width:880px;margin:0 auto;padding:32px 20px}\
form.stack{display:flex;flex-direction:column;gap:12px;max-width:420px}\
input,select{padding:8px;border:1px solid #d1d5db;border-radius:6px;font:inherit}\
button.primary{padding:10px;background:#2563eb;color:#fff;border:none;border-radius:6px;cursor:pointer}\
.error{background:#fee2e2;color:#991b1b;padding:10px 14px;border-radius:6px}\
.notice{background:#dcfce7;color:#166534;padding:10px 14px;border-radius:6px}\
table{border-collapse:collapse;width:100%}td,th{padding:8px;border-bottom:1px solid #e5e7eb;text-align:left}\
.stats{display:flex;gap:16px;flex-wrap:wrap}.stats div{background:#fff;border:1px solid #e5e7eb;border-radius:8px;padding:12px 20px}";

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(user: Option<&AuthUser>) -> String {
    let mut html = String::from(
        r#"<nav><a href="/">cvsite</a><a href="/examples">Examples</a><a href="/sections">Help</a><span class="spacer"></span>"#,
    );
    match user {
        Some(user) => {
            let _ = write!(
                html,
                r#"<a href="/dashboard">Dashboard</a><a href="/upload">Upload</a><a href="/profile">{}</a>
                <form method="post" action="/api/auth/signout"><button type="submit">Sign out</button></form>"#,
                escape(&user.name)
            );
        }
        None => html.push_str(r#"<a href="/login">Sign in</a><a href="/register">Register</a>"#),
    }
    html.push_str("</nav>");
    html
}

/// Wraps `body` (already escaped markup) in the shared page chrome.
pub fn page(title: &str, user: Option<&AuthUser>, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} · cvsite</title><style>{PAGE_CSS}</style></head>\
         <body>{}<main>{body}</main></body></html>",
        escape(title),
        nav(user),
    ))
}

pub fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<p class="error" role="alert">{}</p>"#, escape(message)),
        None => String::new(),
    }
}

pub fn notice_banner(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<p class="notice">{}</p>"#, escape(message)),
        None => String::new(),
    }
}
