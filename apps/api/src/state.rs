use sqlx::PgPool;

use crate::auth::SessionBackend;
use crate::config::Config;
use crate::inference::InferenceClient;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis-backed in production, in-process when `REDIS_URL` is unset.
    pub sessions: SessionBackend,
    pub storage: Storage,
    pub inference: InferenceClient,
    pub config: Config,
}
