use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::models::resume::ParsedResume;
use crate::templates::Theme;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebsiteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Value,
    pub published: bool,
    pub domain: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct WebsiteStats {
    pub websites: i64,
    pub published: i64,
    pub total_views: i64,
}

/// Typed view of `websites.content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: Theme,
    #[serde(default)]
    pub resume: ParsedResume,
    #[serde(default)]
    pub summary: Option<String>,
}

/// An unknown or non-string theme falls back to the default instead of failing the whole document.
fn lenient_theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw.as_str().map(str::parse::<Theme>) {
        Some(Ok(theme)) => theme,
        Some(Err(e)) => {
            warn!("{e}; using the default theme");
            Theme::default()
        }
        None => Theme::default(),
    })
}

impl SiteContent {
    /// Rows written by older clients may hold arbitrary JSON; those read as empty content.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Website content could not be read, using empty content: {e}");
            Self::default()
        })
    }
}

impl WebsiteRow {
    pub fn site_content(&self) -> SiteContent {
        SiteContent::from_value(&self.content)
    }
}
