use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::{conflict_on_unique, AppError};
use crate::models::user::UserRow;

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts a user. `email` must already be normalized; a duplicate yields `Conflict`.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserRow, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "An account with this email already exists"))?;

    info!("Created user {}", user.id);
    Ok(user)
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    avatar_url: Option<&str>,
) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET name = $2, avatar_url = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(avatar_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}
