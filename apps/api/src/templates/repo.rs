use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::template::CvTemplateRow;

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<CvTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, CvTemplateRow>(
        "SELECT * FROM cv_templates WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_for_user(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<CvTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, CvTemplateRow>("SELECT * FROM cv_templates WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &Value,
) -> Result<CvTemplateRow, sqlx::Error> {
    sqlx::query_as::<_, CvTemplateRow>(
        r#"
        INSERT INTO cv_templates (id, user_id, title, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// `None` when the template does not exist or belongs to someone else.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    title: &str,
    content: &Value,
) -> Result<Option<CvTemplateRow>, sqlx::Error> {
    sqlx::query_as::<_, CvTemplateRow>(
        r#"
        UPDATE cv_templates
        SET title = $3, content = $4, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(content)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cv_templates WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cv_templates WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
