use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::website::{SiteContent, WebsiteRow};
use crate::state::AppState;
use crate::storage::site_export_key;
use crate::websites::domain::{derive_domain, normalize_domain};
use crate::websites::render::render_site;
use crate::websites::repo;

const MAX_TITLE_LEN: usize = 200;
/// Attempts at a fresh random suffix when a derived domain collides.
const DERIVED_DOMAIN_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebsiteInput {
    pub title: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub content: SiteContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebsiteUpdate {
    pub title: Option<String>,
    pub domain: Option<String>,
    pub content: Option<SiteContent>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Website {id} not found"))
}

/// Trimmed title, falling back to the CV's display name when absent or blank.
fn resolve_title(title: Option<&str>, content: &SiteContent) -> Result<String, AppError> {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| content.resume.display_name());
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn resolve_domain(raw: &str) -> Result<String, AppError> {
    normalize_domain(raw).map_err(|e| AppError::Validation(e.message()))
}

fn content_value(content: &SiteContent) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(content).map_err(|e| AppError::Internal(e.into()))
}

/// Object-storage work implied by changing or deleting a website.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportPlan {
    /// Key to (re)write with the current rendering.
    pub write: Option<String>,
    /// Key that no longer belongs to any published site.
    pub remove: Option<String>,
}

/// Only published sites have an export. `after` is `None` when the site is deleted.
pub fn export_plan(before: &WebsiteRow, after: Option<&WebsiteRow>) -> ExportPlan {
    if !before.published {
        return ExportPlan::default();
    }
    let old_key = site_export_key(&before.domain);
    match after {
        None => ExportPlan {
            write: None,
            remove: Some(old_key),
        },
        Some(after) => {
            let new_key = site_export_key(&after.domain);
            ExportPlan {
                remove: (new_key != old_key).then_some(old_key),
                write: Some(new_key),
            }
        }
    }
}

async fn export_site(state: &AppState, site: &WebsiteRow) -> Result<(), AppError> {
    let html = render_site(&site.title, &site.site_content());
    state
        .storage
        .put(&site_export_key(&site.domain), html.into_bytes(), "text/html; charset=utf-8")
        .await
}

/// Writes before removing so a renamed site is never left without an export.
/// A failed removal only leaves an unreferenced object behind and is logged.
async fn apply_export_plan(
    state: &AppState,
    plan: &ExportPlan,
    site: Option<&WebsiteRow>,
) -> Result<(), AppError> {
    if let (Some(_), Some(site)) = (&plan.write, site) {
        export_site(state, site).await?;
    }
    if let Some(key) = &plan.remove {
        if let Err(e) = state.storage.delete(key).await {
            warn!("Stale export {key} could not be removed: {e}");
        }
    }
    Ok(())
}

/// Creates a draft website. Without an explicit domain one is derived from the title.
pub async fn create_website(
    state: &AppState,
    user_id: Uuid,
    title: Option<&str>,
    domain: Option<&str>,
    content: SiteContent,
) -> Result<WebsiteRow, AppError> {
    let title = resolve_title(title, &content)?;
    let value = content_value(&content)?;

    let explicit = domain.map(str::trim).filter(|d| !d.is_empty());
    let row = match explicit {
        Some(raw) => {
            let domain = resolve_domain(raw)?;
            repo::create(&state.db, user_id, &title, &value, &domain).await?
        }
        None => {
            let mut attempt = 0;
            loop {
                attempt += 1;
                let domain = derive_domain(&title);
                match repo::create(&state.db, user_id, &title, &value, &domain).await {
                    Err(AppError::Conflict(_)) if attempt < DERIVED_DOMAIN_ATTEMPTS => {
                        warn!("Derived domain {domain} collided, retrying");
                    }
                    other => break other?,
                }
            }
        }
    };

    info!("User {} created website {} ({})", user_id, row.id, row.domain);
    Ok(row)
}

/// GET /api/websites
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<WebsiteRow>>, AppError> {
    Ok(Json(repo::list_for_user(&state.db, user.id).await?))
}

/// POST /api/websites
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<WebsiteInput>,
) -> Result<(StatusCode, Json<WebsiteRow>), AppError> {
    let row = create_website(
        &state,
        user.id,
        input.title.as_deref(),
        input.domain.as_deref(),
        input.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/websites/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WebsiteRow>, AppError> {
    repo::find_for_user(&state.db, user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/websites/:id
///
/// Omitted fields keep their stored values. A published site's export follows
/// the change, including a move to a new domain.
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<WebsiteUpdate>,
) -> Result<Json<WebsiteRow>, AppError> {
    let existing = repo::find_for_user(&state.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let content = update.content.unwrap_or_else(|| existing.site_content());
    let title = match update.title.as_deref() {
        Some(title) => resolve_title(Some(title), &content)?,
        None => existing.title.clone(),
    };
    let domain = match update.domain.as_deref() {
        Some(raw) => resolve_domain(raw)?,
        None => existing.domain.clone(),
    };
    let value = content_value(&content)?;

    let row = repo::update(&state.db, user.id, id, &title, &value, &domain)
        .await?
        .ok_or_else(|| not_found(id))?;
    apply_export_plan(&state, &export_plan(&existing, Some(&row)), Some(&row)).await?;
    Ok(Json(row))
}

/// DELETE /api/websites/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = repo::find_for_user(&state.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !repo::delete(&state.db, user.id, id).await? {
        return Err(not_found(id));
    }
    apply_export_plan(&state, &export_plan(&existing, None), None).await?;
    info!("User {} deleted website {}", user.id, id);
    Ok(StatusCode::NO_CONTENT)
}

/// Uploads the static export before flipping the flag, so a published site
/// always has one.
pub async fn publish_website(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<WebsiteRow, AppError> {
    let site = repo::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    export_site(state, &site).await?;

    let row = repo::set_published(&state.db, user_id, id, true)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!("Published website {} at /sites/{}", row.id, row.domain);
    Ok(row)
}

pub async fn unpublish_website(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<WebsiteRow, AppError> {
    let row = repo::set_published(&state.db, user_id, id, false)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Err(e) = state.storage.delete(&site_export_key(&row.domain)).await {
        warn!("Website {} unpublished but export cleanup failed: {e}", row.id);
    }
    info!("Unpublished website {}", row.id);
    Ok(row)
}

/// POST /api/websites/:id/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WebsiteRow>, AppError> {
    Ok(Json(publish_website(&state, user.id, id).await?))
}

/// POST /api/websites/:id/unpublish
pub async fn handle_unpublish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WebsiteRow>, AppError> {
    Ok(Json(unpublish_website(&state, user.id, id).await?))
}

/// GET /api/websites/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let site = repo::find_for_user(&state.db, user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Html(render_site(&site.title, &site.site_content())))
}

/// GET /sites/:domain
pub async fn handle_public_site(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Html<String>, AppError> {
    let missing = || AppError::NotFound(format!("No published site at '{domain}'"));
    let normalized = normalize_domain(&domain).map_err(|_| missing())?;
    let site = repo::record_public_view(&state.db, &normalized)
        .await?
        .ok_or_else(missing)?;
    Ok(Html(render_site(&site.title, &site.site_content())))
}
