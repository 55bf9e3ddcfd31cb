use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{conflict_on_unique, AppError};
use crate::models::website::{WebsiteRow, WebsiteStats};

const DOMAIN_TAKEN: &str = "That domain is already taken";

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<WebsiteRow>, sqlx::Error> {
    sqlx::query_as::<_, WebsiteRow>(
        "SELECT * FROM websites WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_for_user(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<WebsiteRow>, sqlx::Error> {
    sqlx::query_as::<_, WebsiteRow>("SELECT * FROM websites WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// A duplicate `domain` yields `Conflict`.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &Value,
    domain: &str,
) -> Result<WebsiteRow, AppError> {
    sqlx::query_as::<_, WebsiteRow>(
        r#"
        INSERT INTO websites (id, user_id, title, content, domain)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(domain)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, DOMAIN_TAKEN))
}

pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    title: &str,
    content: &Value,
    domain: &str,
) -> Result<Option<WebsiteRow>, AppError> {
    sqlx::query_as::<_, WebsiteRow>(
        r#"
        UPDATE websites
        SET title = $3, content = $4, domain = $5, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(domain)
    .fetch_optional(pool)
    .await
    .map_err(|e| conflict_on_unique(e, DOMAIN_TAKEN))
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM websites WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_published(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    published: bool,
) -> Result<Option<WebsiteRow>, sqlx::Error> {
    sqlx::query_as::<_, WebsiteRow>(
        r#"
        UPDATE websites
        SET published = $3, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(published)
    .fetch_optional(pool)
    .await
}

/// Counts a visit and returns the site, only when it is published.
pub async fn record_public_view(
    pool: &PgPool,
    domain: &str,
) -> Result<Option<WebsiteRow>, sqlx::Error> {
    sqlx::query_as::<_, WebsiteRow>(
        r#"
        UPDATE websites
        SET view_count = view_count + 1
        WHERE domain = $1 AND published = TRUE
        RETURNING *
        "#,
    )
    .bind(domain)
    .fetch_optional(pool)
    .await
}

pub async fn stats_for_user(pool: &PgPool, user_id: Uuid) -> Result<WebsiteStats, sqlx::Error> {
    sqlx::query_as::<_, WebsiteStats>(
        r#"
        SELECT
            COUNT(*) AS websites,
            COUNT(*) FILTER (WHERE published) AS published,
            COALESCE(SUM(view_count), 0)::BIGINT AS total_views
        FROM websites
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
