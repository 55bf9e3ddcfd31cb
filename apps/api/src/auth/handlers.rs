//! Sign-in, sign-up, sign-out and session endpoints.
//!
//! The form endpoints answer with redirects rather than JSON so plain HTML
//! forms work: failures bounce back to the originating page with `?error=<Code>`.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;
use tracing::info;
use url::form_urlencoded;

use crate::auth::credentials::authorize;
use crate::auth::error_codes;
use crate::auth::guard::{sanitize_callback_url, DASHBOARD_PATH, LOGIN_PATH};
use crate::auth::password::hash_password_blocking;
use crate::auth::session::{sign_in, sign_out, AuthUser};
use crate::auth::validation::{normalize_email, validate_registration, RegisterError, RegisterForm};
use crate::errors::AppError;
use crate::state::AppState;
use crate::users::repo;

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

fn login_error_url(code: &str, callback_url: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("error", code);
    if let Some(cb) = callback_url {
        query.append_pair("callbackUrl", cb);
    }
    format!("{LOGIN_PATH}?{}", query.finish())
}

fn register_error_url(err: RegisterError) -> String {
    format!("/register?error={}", err.code())
}

/// POST /api/auth/callback/credentials
pub async fn handle_sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    let callback_url = sanitize_callback_url(form.callback_url.as_deref());

    let Some(user) = authorize(&state.db, &form.email, &form.password).await? else {
        return Ok(Redirect::to(&login_error_url("CredentialsSignin", Some(&callback_url)))
            .into_response());
    };

    sign_in(&session, &user).await?;
    info!("User {} signed in", user.id);
    Ok(Redirect::to(&callback_url).into_response())
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(err) = validate_registration(&form) {
        return Ok(Redirect::to(&register_error_url(err)).into_response());
    }

    let email = normalize_email(&form.email);
    if repo::find_by_email(&state.db, &email).await?.is_some() {
        return Ok(Redirect::to(&register_error_url(RegisterError::EmailTaken)).into_response());
    }

    let hash = hash_password_blocking(form.password.clone()).await?;
    let user = match repo::create_user(&state.db, form.name.trim(), &email, &hash).await {
        Ok(user) => user,
        // Lost a race with a concurrent sign-up for the same address.
        Err(AppError::Conflict(_)) => {
            return Ok(Redirect::to(&register_error_url(RegisterError::EmailTaken)).into_response())
        }
        Err(e) => return Err(e),
    };

    sign_in(&session, &user).await?;
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

/// POST /api/auth/signout
pub async fn handle_sign_out(
    session: Session,
    user: Option<AuthUser>,
) -> Result<Response, AppError> {
    sign_out(&session).await?;
    if let Some(user) = user {
        info!("User {} signed out", user.id);
    }
    Ok(Redirect::to(LOGIN_PATH).into_response())
}

/// GET /api/auth/session
///
/// Returns `{}` for anonymous callers so clients can test for `user`.
pub async fn handle_session(user: Option<AuthUser>) -> Json<Value> {
    Json(session_body(user.as_ref()))
}

pub fn session_body(user: Option<&AuthUser>) -> Value {
    match user {
        Some(user) => json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "image": user.avatar_url,
            },
            "expires": user.expires_at.to_rfc3339(),
        }),
        None => json!({}),
    }
}

/// GET /api/auth/error?error=<code>
pub async fn handle_error_message(Query(q): Query<ErrorQuery>) -> Json<Value> {
    let code = q.error.as_deref().unwrap_or("Default");
    Json(json!({
        "error": code,
        "message": error_codes::message_for(Some(code)).unwrap_or(error_codes::DEFAULT_MESSAGE),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_login_error_url_keeps_callback() {
        assert_eq!(
            login_error_url("CredentialsSignin", Some("/upload")),
            "/login?error=CredentialsSignin&callbackUrl=%2Fupload"
        );
    }

    #[test]
    fn test_register_error_url() {
        assert_eq!(
            register_error_url(RegisterError::PasswordMismatch),
            "/register?error=PasswordMismatch"
        );
    }

    #[test]
    fn test_session_body_anonymous_is_empty_object() {
        assert_eq!(session_body(None), json!({}));
    }

    #[test]
    fn test_session_body_exposes_public_fields_only() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            avatar_url: None,
            expires_at: Utc::now(),
        };
        let body = session_body(Some(&user));
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"].as_object().unwrap().len(), 4);
        assert!(body["expires"].is_string());
    }

    #[test]
    fn test_sign_in_form_accepts_camel_case_callback() {
        let form: SignInForm =
            serde_json::from_str(r#"{"email":"a@b.co","password":"x","callbackUrl":"/profile"}"#)
                .unwrap();
        assert_eq!(form.callback_url.as_deref(), Some("/profile"));
    }
}
