use axum::{extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use crate::auth::session::refresh_user;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::users::repo;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default, alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

/// Returns the trimmed name and avatar, or a message describing the first problem.
pub fn validate_profile(update: &ProfileUpdate) -> Result<(String, Option<String>), String> {
    let name = update.name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    let avatar = update
        .avatar_url
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(url) = avatar {
        let parsed = url::Url::parse(url).map_err(|_| "Avatar URL is not a valid URL".to_string())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("Avatar URL must use http or https".to_string());
        }
    }
    Ok((name.to_string(), avatar.map(String::from)))
}

/// Applies a profile update and mirrors it into the caller's session.
pub async fn apply_profile_update(
    state: &AppState,
    session: &Session,
    user: &AuthUser,
    update: &ProfileUpdate,
) -> Result<UserRow, AppError> {
    let (name, avatar) = validate_profile(update).map_err(AppError::Validation)?;
    let updated = repo::update_profile(&state.db, user.id, &name, avatar.as_deref()).await?;
    if let Err(e) = refresh_user(session, &updated).await {
        warn!("Profile saved but session refresh failed for {}: {e}", user.id);
    }
    Ok(updated)
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserRow>, AppError> {
    let row = repo::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(row))
}

/// PUT /api/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    session: Session,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserRow>, AppError> {
    let row = apply_profile_update(&state, &session, &user, &update).await?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(name: &str, avatar: Option<&str>) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            avatar_url: avatar.map(String::from),
        }
    }

    #[test]
    fn test_profile_requires_name() {
        assert!(validate_profile(&update("  ", None)).is_err());
    }

    #[test]
    fn test_profile_trims_and_drops_blank_avatar() {
        let (name, avatar) = validate_profile(&update("  Ada ", Some("  "))).unwrap();
        assert_eq!(name, "Ada");
        assert!(avatar.is_none());
    }

    #[test]
    fn test_profile_rejects_non_http_avatar() {
        assert!(validate_profile(&update("Ada", Some("javascript:alert(1)"))).is_err());
        assert!(validate_profile(&update("Ada", Some("ftp://host/a.png"))).is_err());
        assert!(validate_profile(&update("Ada", Some("https://cdn.example.com/a.png"))).is_ok());
    }
}
