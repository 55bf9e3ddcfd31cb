use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::verify_password_blocking;
use crate::auth::validation::normalize_email;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::users::repo;

/// Checks an email/password pair. `Ok(None)` means "wrong credentials";
/// callers must not reveal which half was wrong.
pub async fn authorize(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<UserRow>, AppError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some(user) = repo::find_by_email(pool, &email).await? else {
        info!("Sign-in attempt for unknown email");
        return Ok(None);
    };

    match verify_password_blocking(password.to_string(), user.password_hash.clone()).await {
        Ok(true) => Ok(Some(user)),
        Ok(false) => {
            info!("Sign-in rejected for user {}", user.id);
            Ok(None)
        }
        Err(e) => {
            warn!("Stored password hash for user {} is unusable: {e}", user.id);
            Ok(None)
        }
    }
}
