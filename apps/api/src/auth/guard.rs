//! Page guard: protected pages need a session, auth pages need the absence of one.
//!
//! Runs inside the session layer and asks the [`AuthUser`] extractor whether
//! anyone is signed in. JSON APIs are not redirected here; they reject through
//! the same extractor in their handlers.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use crate::auth::session::AuthUser;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/profile", "/upload"];
const AUTH_PAGES: &[&str] = &["/login", "/register"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Anonymous visitor on a protected page; carries the path to come back to.
    RedirectToLogin { callback_url: String },
    /// Signed-in visitor on the login or register page.
    RedirectToDashboard,
}

impl GuardDecision {
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin { callback_url } => Some(login_url(callback_url)),
            GuardDecision::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
        }
    }
}

/// Matches `prefix` itself or anything below it, never a sibling like `/dashboards`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|p| matches_prefix(path, p))
}

pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.iter().any(|p| matches_prefix(path, p))
}

pub fn decide(path: &str, query: Option<&str>, authenticated: bool) -> GuardDecision {
    if !authenticated && is_protected(path) {
        let callback_url = match query.filter(|q| !q.is_empty()) {
            Some(q) => format!("{path}?{q}"),
            None => path.to_string(),
        };
        return GuardDecision::RedirectToLogin { callback_url };
    }
    if authenticated && is_auth_page(path) {
        return GuardDecision::RedirectToDashboard;
    }
    GuardDecision::Allow
}

pub fn login_url(callback_url: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback_url)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Accepts only same-site relative paths; anything else falls back to the dashboard.
pub fn sanitize_callback_url(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.starts_with("/\\")
                && !url.contains("://")
                && !url.chars().any(char::is_control) =>
        {
            url.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}

pub async fn route_guard(user: Option<AuthUser>, req: Request, next: Next) -> Response {
    let authenticated = user.is_some();
    let decision = decide(req.uri().path(), req.uri().query(), authenticated);
    match decision.location() {
        Some(location) => Redirect::to(&location).into_response(),
        None => next.run(req).await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        middleware::from_fn,
        routing::{get, post},
        Router,
    };
    use chrono::Utc;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};
    use uuid::Uuid;

    use super::*;
    use crate::auth::session::{session_layer, sign_in, signing_key, SessionBackend};
    use crate::models::user::UserRow;

    #[test]
    fn test_anonymous_protected_page_redirects_with_callback() {
        let decision = decide("/dashboard", None, false);
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                callback_url: "/dashboard".to_string()
            }
        );
        assert_eq!(
            decision.location().unwrap(),
            "/login?callbackUrl=%2Fdashboard"
        );
    }

    #[test]
    fn test_callback_keeps_query_string() {
        let decision = decide("/profile/edit", Some("tab=avatar"), false);
        assert_eq!(
            decision,
            GuardDecision::RedirectToLogin {
                callback_url: "/profile/edit?tab=avatar".to_string()
            }
        );
    }

    #[test]
    fn test_authenticated_auth_pages_redirect_to_dashboard() {
        assert_eq!(decide("/login", None, true), GuardDecision::RedirectToDashboard);
        assert_eq!(
            decide("/register", None, true),
            GuardDecision::RedirectToDashboard
        );
    }

    #[test]
    fn test_anonymous_auth_pages_are_allowed() {
        assert_eq!(decide("/login", None, false), GuardDecision::Allow);
        assert_eq!(decide("/register", None, false), GuardDecision::Allow);
    }

    #[test]
    fn test_public_paths_are_allowed_either_way() {
        for path in ["/", "/examples", "/sections", "/sites/ada", "/api/search"] {
            assert_eq!(decide(path, None, false), GuardDecision::Allow);
            assert_eq!(decide(path, None, true), GuardDecision::Allow);
        }
    }

    #[test]
    fn test_prefix_match_respects_segment_boundary() {
        assert!(is_protected("/upload"));
        assert!(is_protected("/upload/step-2"));
        assert!(!is_protected("/uploads"));
        assert!(!is_protected("/dashboard-preview"));
    }

    #[test]
    fn test_sanitize_callback_url() {
        assert_eq!(sanitize_callback_url(Some("/profile")), "/profile");
        assert_eq!(
            sanitize_callback_url(Some("/upload?x=1")),
            "/upload?x=1"
        );
        assert_eq!(sanitize_callback_url(Some("//evil.com")), "/dashboard");
        assert_eq!(
            sanitize_callback_url(Some("https://evil.com/x")),
            "/dashboard"
        );
        assert_eq!(sanitize_callback_url(Some("/\\evil.com")), "/dashboard");
        assert_eq!(sanitize_callback_url(None), "/dashboard");
    }

    fn app() -> Router {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password_hash: String::new(),
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let layer = session_layer(
            SessionBackend::Memory(MemoryStore::default()),
            signing_key("guard-test").unwrap(),
            Duration::from_secs(600),
            false,
        )
        .unwrap();
        Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/login", get(|| async { "login" }))
            .route("/", get(|| async { "home" }))
            .route(
                "/test-sign-in",
                post(move |session: Session| {
                    let row = row.clone();
                    async move { sign_in(&session, &row).await.map(|_| StatusCode::NO_CONTENT) }
                }),
            )
            .layer(from_fn(route_guard))
            .layer(layer)
    }

    fn get_request(path: &str, cookie: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_router_redirects_anonymous_dashboard_visit() {
        let response = app()
            .oneshot(get_request("/dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?callbackUrl=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn test_router_bounces_signed_in_user_from_login() {
        let app = app();
        let signed_in = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/test-sign-in")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let set_cookie = signed_in.headers()[header::SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let login = app
            .clone()
            .oneshot(get_request("/login", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::SEE_OTHER);
        assert_eq!(login.headers()[header::LOCATION], "/dashboard");

        let dashboard = app
            .oneshot(get_request("/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(dashboard.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_treats_stale_cookie_as_anonymous() {
        let response = app()
            .oneshot(get_request("/dashboard", Some("cvsite_session=stale")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let home = app()
            .oneshot(get_request("/", Some("cvsite_session=stale")))
            .await
            .unwrap();
        assert_eq!(home.status(), StatusCode::OK);
    }
}
