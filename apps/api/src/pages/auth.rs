use axum::{extract::Query, response::Html};
use serde::Deserialize;

use crate::auth::error_codes::message_for;
use crate::auth::guard::sanitize_callback_url;
use crate::auth::validation::MIN_PASSWORD_LEN;
use crate::pages::html::{error_banner, escape, page};

#[derive(Debug, Default, Deserialize)]
pub struct AuthPageQuery {
    pub error: Option<String>,
    #[serde(alias = "callbackUrl")]
    pub callback_url: Option<String>,
}

pub fn login_body(query: &AuthPageQuery) -> String {
    let callback = sanitize_callback_url(query.callback_url.as_deref());
    format!(
        r#"<h1>Sign in</h1>{error}
<form class="stack" method="post" action="/api/auth/callback/credentials">
<input type="hidden" name="callbackUrl" value="{callback}">
<label>Email <input type="email" name="email" required autocomplete="email"></label>
<label>Password <input type="password" name="password" required autocomplete="current-password"></label>
<button class="primary" type="submit">Sign in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
        error = error_banner(message_for(query.error.as_deref())),
        callback = escape(&callback),
    )
}

pub fn register_body(query: &AuthPageQuery) -> String {
    format!(
        r#"<h1>Create your account</h1>{error}
<form class="stack" method="post" action="/api/auth/register">
<label>Name <input type="text" name="name" required autocomplete="name"></label>
<label>Email <input type="email" name="email" required autocomplete="email"></label>
<label>Password <input type="password" name="password" required minlength="{min}" autocomplete="new-password"></label>
<label>Confirm password <input type="password" name="confirm_password" required minlength="{min}" autocomplete="new-password"></label>
<button class="primary" type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Sign in</a></p>"#,
        error = error_banner(message_for(query.error.as_deref())),
        min = MIN_PASSWORD_LEN,
    )
}

/// GET /login
pub async fn login_page(Query(query): Query<AuthPageQuery>) -> Html<String> {
    page("Sign in", None, &login_body(&query))
}

/// GET /register
pub async fn register_page(Query(query): Query<AuthPageQuery>) -> Html<String> {
    page("Register", None, &register_body(&query))
}
