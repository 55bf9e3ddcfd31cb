use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::template::CvTemplateRow;
use crate::state::AppState;
use crate::templates::catalog::{catalog, ThemeInfo};
use crate::templates::repo;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInput {
    pub title: String,
    #[serde(default)]
    pub content: Value,
}

/// Returns the trimmed title; `content` defaults to an empty object.
fn validate_input(input: &TemplateInput) -> Result<(String, Value), AppError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    let content = match &input.content {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    Ok((title.to_string(), content))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Template {id} not found"))
}

/// GET /api/templates/catalog
pub async fn handle_catalog() -> Json<Vec<ThemeInfo>> {
    Json(catalog())
}

/// GET /api/templates
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CvTemplateRow>>, AppError> {
    Ok(Json(repo::list_for_user(&state.db, user.id).await?))
}

/// POST /api/templates
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<TemplateInput>,
) -> Result<(StatusCode, Json<CvTemplateRow>), AppError> {
    let (title, content) = validate_input(&input)?;
    let row = repo::create(&state.db, user.id, &title, &content).await?;
    info!("User {} created template {}", user.id, row.id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/templates/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CvTemplateRow>, AppError> {
    repo::find_for_user(&state.db, user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/templates/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<TemplateInput>,
) -> Result<Json<CvTemplateRow>, AppError> {
    let (title, content) = validate_input(&input)?;
    repo::update(&state.db, user.id, id, &title, &content)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/templates/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user.id, id).await? {
        return Err(not_found(id));
    }
    info!("User {} deleted template {}", user.id, id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(title: &str, content: Value) -> TemplateInput {
        TemplateInput {
            title: title.to_string(),
            content,
        }
    }

    #[test]
    fn test_blank_title_is_rejected() {
        assert!(matches!(
            validate_input(&input("   ", json!({}))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_overlong_title_is_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_input(&input(&long, json!({}))).is_err());
    }

    #[test]
    fn test_title_trimmed_and_null_content_defaults() {
        let (title, content) = validate_input(&input("  My Layout ", Value::Null)).unwrap();
        assert_eq!(title, "My Layout");
        assert_eq!(content, json!({}));
    }

    #[test]
    fn test_missing_content_deserializes_as_null() {
        let parsed: TemplateInput = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert_eq!(parsed.content, Value::Null);
        let (_, content) = validate_input(&parsed).unwrap();
        assert_eq!(content, json!({}));
    }
}
