pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use crate::auth::{guard::route_guard, handlers as auth, session::SessionLayer};
use crate::pages::{account, auth as auth_pages, public};
use crate::state::AppState;
use crate::{dashboard, inference, resume, search, templates, users, websites};

pub fn build_router(state: AppState, sessions: SessionLayer) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/supabase-test", get(health::connectivity_handler))
        // Auth
        .route(
            "/api/auth/callback/credentials",
            post(auth::handle_sign_in),
        )
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/signout", post(auth::handle_sign_out))
        .route("/api/auth/session", get(auth::handle_session))
        .route("/api/auth/error", get(auth::handle_error_message))
        // Profile
        .route(
            "/api/profile",
            get(users::handlers::handle_get_profile).put(users::handlers::handle_update_profile),
        )
        // CV parsing and storage
        .route("/api/resume/parse", post(resume::handlers::handle_parse))
        .route("/api/upload", post(resume::handlers::handle_upload))
        // AI
        .route("/api/ai/feedback", post(inference::handlers::handle_feedback))
        .route("/api/ai/summary", post(inference::handlers::handle_summary))
        // Templates
        .route(
            "/api/templates/catalog",
            get(templates::handlers::handle_catalog),
        )
        .route(
            "/api/templates",
            get(templates::handlers::handle_list).post(templates::handlers::handle_create),
        )
        .route(
            "/api/templates/:id",
            get(templates::handlers::handle_get)
                .put(templates::handlers::handle_update)
                .delete(templates::handlers::handle_delete),
        )
        // Websites
        .route(
            "/api/websites",
            get(websites::handlers::handle_list).post(websites::handlers::handle_create),
        )
        .route(
            "/api/websites/:id",
            get(websites::handlers::handle_get)
                .put(websites::handlers::handle_update)
                .delete(websites::handlers::handle_delete),
        )
        .route(
            "/api/websites/:id/publish",
            post(websites::handlers::handle_publish),
        )
        .route(
            "/api/websites/:id/unpublish",
            post(websites::handlers::handle_unpublish),
        )
        .route(
            "/api/websites/:id/preview",
            get(websites::handlers::handle_preview),
        )
        .route("/sites/:domain", get(websites::handlers::handle_public_site))
        // Search and analytics
        .route("/api/search", get(search::handle_search))
        .route("/api/dashboard", get(dashboard::handle_dashboard))
        // Pages
        .route("/", get(public::home_page))
        .route("/login", get(auth_pages::login_page))
        .route("/register", get(auth_pages::register_page))
        .route("/examples", get(public::examples_page))
        .route("/examples/:theme", get(public::example_preview))
        .route("/sections", get(public::sections_page))
        .route("/dashboard", get(account::dashboard_page))
        .route(
            "/dashboard/websites/:id/publish",
            post(account::publish_action),
        )
        .route(
            "/dashboard/websites/:id/unpublish",
            post(account::unpublish_action),
        )
        .route(
            "/upload",
            get(account::upload_page).post(account::upload_action),
        )
        .route(
            "/profile",
            get(account::profile_page).post(account::profile_action),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        // Layers run bottom-up: the session is attached before the guard looks at it.
        .layer(from_fn(route_guard))
        .layer(sessions)
        .with_state(state)
}
