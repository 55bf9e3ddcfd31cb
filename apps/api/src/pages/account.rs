//! Pages behind the sign-in guard: dashboard, upload and profile.

use std::fmt::Write;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};
use url::form_urlencoded;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::dashboard::{load_stats, DashboardStats};
use crate::errors::AppError;
use crate::inference::feedback::clean_summary;
use crate::inference::prompts::site_summary_prompt;
use crate::models::user::UserRow;
use crate::models::website::{SiteContent, WebsiteRow};
use crate::pages::html::{error_banner, escape, notice_banner, page};
use crate::resume::handlers::read_multipart;
use crate::resume::parse_document;
use crate::state::AppState;
use crate::templates::Theme;
use crate::users::handlers::{apply_profile_update, ProfileUpdate};
use crate::users::repo as users_repo;
use crate::websites::handlers::{create_website, publish_website, unpublish_website};
use crate::websites::repo as websites_repo;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub created: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub saved: Option<String>,
}

fn dashboard_url(param: &str, value: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(param, value)
        .finish();
    format!("/dashboard?{query}")
}

/// Client errors are shown on the page; anything else propagates as a 5xx.
fn client_message(err: AppError) -> Result<String, AppError> {
    match err.user_message() {
        Some(message) => Ok(message.to_string()),
        None => Err(err),
    }
}

pub fn dashboard_body(
    user: &AuthUser,
    stats: &DashboardStats,
    sites: &[WebsiteRow],
    query: &DashboardQuery,
) -> String {
    let mut html = format!("<h1>Welcome, {}</h1>", escape(&user.name));
    html.push_str(&error_banner(query.error.as_deref()));
    if let Some(domain) = &query.created {
        html.push_str(&notice_banner(Some(&format!("Created draft website '{domain}'."))));
    }

    let _ = write!(
        html,
        r#"<section class="stats"><div><strong>{}</strong> websites</div><div><strong>{}</strong> published</div><div><strong>{}</strong> templates</div><div><strong>{}</strong> total views</div></section>"#,
        stats.websites, stats.published, stats.templates, stats.total_views
    );

    if sites.is_empty() {
        html.push_str(r#"<p>No websites yet. <a href="/upload">Upload your CV</a> to create one.</p>"#);
        return html;
    }

    html.push_str("<h2>Your websites</h2><table><thead><tr><th>Title</th><th>Domain</th><th>Theme</th><th>Views</th><th>Status</th><th></th></tr></thead><tbody>");
    for site in sites {
        let content = site.site_content();
        let domain = escape(&site.domain);
        let status = if site.published {
            format!(r#"<a href="/sites/{domain}">Published</a>"#)
        } else {
            "Draft".to_string()
        };
        let (action, label) = if site.published {
            ("unpublish", "Unpublish")
        } else {
            ("publish", "Publish")
        };
        let _ = write!(
            html,
            r#"<tr><td>{title}</td><td>{domain}</td><td>{theme}</td><td>{views}</td><td>{status}</td><td><a href="/api/websites/{id}/preview">Preview</a> <form method="post" action="/dashboard/websites/{id}/{action}" style="display:inline"><button type="submit">{label}</button></form></td></tr>"#,
            title = escape(&site.title),
            theme = content.theme.name(),
            views = site.view_count,
            id = site.id,
        );
    }
    html.push_str("</tbody></table>");
    html
}

/// GET /dashboard
pub async fn dashboard_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let (stats, sites) = tokio::try_join!(
        load_stats(&state, user.id),
        async {
            websites_repo::list_for_user(&state.db, user.id)
                .await
                .map_err(AppError::from)
        },
    )?;
    Ok(page(
        "Dashboard",
        Some(&user),
        &dashboard_body(&user, &stats, &sites, &query),
    ))
}

async fn toggle_publish(state: &AppState, user: &AuthUser, id: Uuid, publish: bool) -> Result<Redirect, AppError> {
    let result = if publish {
        publish_website(state, user.id, id).await
    } else {
        unpublish_website(state, user.id, id).await
    };
    match result {
        Ok(_) => Ok(Redirect::to("/dashboard")),
        Err(e) => Ok(Redirect::to(&dashboard_url("error", &client_message(e)?))),
    }
}

/// POST /dashboard/websites/:id/publish
pub async fn publish_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    toggle_publish(&state, &user, id, true).await
}

/// POST /dashboard/websites/:id/unpublish
pub async fn unpublish_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    toggle_publish(&state, &user, id, false).await
}

pub fn upload_body(error: Option<&str>, ai_available: bool) -> String {
    let themes: String = Theme::ALL
        .iter()
        .map(|t| {
            let selected = if *t == Theme::default() { " selected" } else { "" };
            format!(r#"<option value="{}"{selected}>{}</option>"#, t.slug(), t.name())
        })
        .collect();
    let summary_option = if ai_available {
        r#"<label><input type="checkbox" name="generate_summary" value="on"> Draft a summary with AI</label>"#
    } else {
        ""
    };
    format!(
        r#"<h1>Upload your CV</h1>{error}
<form class="stack" method="post" action="/upload" enctype="multipart/form-data">
<label>CV file (PDF, DOCX or TXT) <input type="file" name="file" accept=".pdf,.docx,.txt,.md" required></label>
<label>Website title <input type="text" name="title" placeholder="Defaults to your name"></label>
<label>Domain <input type="text" name="domain" placeholder="Leave blank to generate one" pattern="[a-z0-9-]{{3,63}}"></label>
<label>Theme <select name="theme">{themes}</select></label>
{summary_option}
<button class="primary" type="submit">Create website</button>
</form>"#,
        error = error_banner(error),
    )
}

/// GET /upload
pub async fn upload_page(State(state): State<AppState>, user: AuthUser) -> Html<String> {
    page(
        "Upload",
        Some(&user),
        &upload_body(None, state.inference.is_configured()),
    )
}

async fn draft_summary(state: &AppState, content: &SiteContent) -> Option<String> {
    match state.inference.generate(&site_summary_prompt(&content.resume)).await {
        Ok(raw) => Some(clean_summary(&raw)).filter(|s| !s.is_empty()),
        Err(e) => {
            warn!("Summary generation during upload failed: {e}");
            None
        }
    }
}

async fn create_from_upload(
    state: &AppState,
    user: &AuthUser,
    multipart: Multipart,
) -> Result<WebsiteRow, AppError> {
    let form = read_multipart(multipart).await?;
    let theme = match form.field("theme") {
        Some(raw) => raw.parse::<Theme>().map_err(AppError::Validation)?,
        None => Theme::default(),
    };
    let title = form.field("title").map(String::from);
    let domain = form.field("domain").map(String::from);
    let wants_summary = form.field("generate_summary").is_some();

    let (file, _) = form.require_file()?;
    let resume = parse_document(&file.name, file.content_type.as_deref(), file.data).await?;

    let mut content = SiteContent {
        theme,
        resume,
        summary: None,
    };
    if wants_summary && state.inference.is_configured() {
        content.summary = draft_summary(state, &content).await;
    }

    create_website(state, user.id, title.as_deref(), domain.as_deref(), content).await
}

/// POST /upload
pub async fn upload_action(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    match create_from_upload(&state, &user, multipart).await {
        Ok(site) => {
            info!("User {} created website {} from an upload", user.id, site.id);
            Ok(Redirect::to(&dashboard_url("created", &site.domain)).into_response())
        }
        Err(e) => {
            let message = client_message(e)?;
            let body = upload_body(Some(&message), state.inference.is_configured());
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page("Upload", Some(&user), &body)).into_response())
        }
    }
}

pub fn profile_body(user: &UserRow, error: Option<&str>, saved: bool) -> String {
    let notice = if saved { Some("Profile saved.") } else { None };
    format!(
        r#"<h1>Your profile</h1>{error}{notice}
<form class="stack" method="post" action="/profile">
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Email <input type="email" value="{email}" disabled></label>
<label>Avatar URL <input type="url" name="avatar_url" value="{avatar}"></label>
<button class="primary" type="submit">Save</button>
</form>"#,
        error = error_banner(error),
        notice = notice_banner(notice),
        name = escape(&user.name),
        email = escape(&user.email),
        avatar = escape(user.avatar_url.as_deref().unwrap_or_default()),
    )
}

/// GET /profile
pub async fn profile_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Html<String>, AppError> {
    let row = users_repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(page(
        "Profile",
        Some(&user),
        &profile_body(&row, None, query.saved.is_some()),
    ))
}

/// POST /profile
pub async fn profile_action(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    Form(update): Form<ProfileUpdate>,
) -> Result<Response, AppError> {
    match apply_profile_update(&state, &session, &user, &update).await {
        Ok(_) => Ok(Redirect::to("/profile?saved=1").into_response()),
        Err(e) => {
            let message = client_message(e)?;
            // Re-render with what was submitted so the user can correct it.
            let mut row = users_repo::find_by_id(&state.db, user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
            row.name = update.name.clone();
            row.avatar_url = update.avatar_url.clone();
            let body = profile_body(&row, Some(&message), false);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page("Profile", Some(&user), &body)).into_response())
        }
    }
}
