//! Per-user counters for the dashboard.

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::website::WebsiteStats;
use crate::state::AppState;
use crate::{templates, websites};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub websites: i64,
    pub published: i64,
    pub templates: i64,
    pub total_views: i64,
}

impl DashboardStats {
    pub fn from_parts(sites: WebsiteStats, templates: i64) -> Self {
        Self {
            websites: sites.websites,
            published: sites.published,
            templates,
            total_views: sites.total_views,
        }
    }
}

pub async fn load_stats(state: &AppState, user_id: Uuid) -> Result<DashboardStats, AppError> {
    let (sites, templates) = tokio::try_join!(
        websites::repo::stats_for_user(&state.db, user_id),
        templates::repo::count_for_user(&state.db, user_id),
    )?;
    Ok(DashboardStats::from_parts(sites, templates))
}

/// GET /api/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(load_stats(&state, user.id).await?))
}
