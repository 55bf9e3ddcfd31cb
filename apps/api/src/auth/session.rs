//! Cookie sessions on top of `tower-sessions`.
//!
//! The signed-in user is stored under [`USER_KEY`] in the session record.
//! Records live in Redis when `REDIS_URL` is set and in process memory
//! otherwise; [`SessionBackend`] picks between the two at startup.

use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    session::{Id, Record},
    session_store, Expiry, MemoryStore, Session, SessionManagerLayer, SessionStore,
};
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::UserRow;

pub const SESSION_COOKIE: &str = "cvsite_session";
pub const USER_KEY: &str = "user";
const KEY_PREFIX: &str = "session:";

/// What a session remembers about its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl From<&UserRow> for SessionUser {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Starts a fresh session for `user`. The id is cycled so a pre-login cookie is never reused.
pub async fn sign_in(session: &Session, user: &UserRow) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, SessionUser::from(user)).await?;
    Ok(())
}

/// Rewrites the cached profile fields after a profile edit.
pub async fn refresh_user(session: &Session, user: &UserRow) -> Result<(), AppError> {
    session.insert(USER_KEY, SessionUser::from(user)).await?;
    Ok(())
}

/// Deletes the record and expires the cookie.
pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Redis store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> session_store::Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)
    }

    /// `SET key payload EX ttl [NX]`; returns false when NX refused the write.
    async fn write(&self, record: &Record, only_if_new: bool) -> session_store::Result<bool> {
        let payload = serde_json::to_string(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(storage_key(&record.id))
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs(record.expiry_date.unix_timestamp(), Utc::now().timestamp()));
        if only_if_new {
            cmd.arg("NX");
        }
        let mut conn = self.connection().await?;
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(backend_error)?;
        Ok(reply.is_some())
    }

    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while !self.write(record, true).await? {
            record.id = Id::default();
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.write(record, false).await?;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(storage_key(session_id))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut conn = self.connection().await?;
        let _: i64 = redis::cmd("DEL")
            .arg(storage_key(session_id))
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

fn backend_error(e: redis::RedisError) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn storage_key(id: &Id) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Seconds until `expires_at`, never below one so Redis accepts the `EX`.
fn ttl_secs(expires_at: i64, now: i64) -> u64 {
    u64::try_from(expires_at.saturating_sub(now)).unwrap_or(0).max(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Backend selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum SessionBackend {
    Redis(RedisStore),
    /// Single-instance deployments and tests.
    Memory(MemoryStore),
}

impl SessionBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SessionBackend::Redis(_) => "redis",
            SessionBackend::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        match self {
            SessionBackend::Redis(store) => store.ping().await,
            SessionBackend::Memory(_) => Ok(()),
        }
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Redis(store) => store.create(record).await,
            SessionBackend::Memory(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Redis(store) => store.save(record).await,
            SessionBackend::Memory(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            SessionBackend::Redis(store) => store.load(session_id).await,
            SessionBackend::Memory(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            SessionBackend::Redis(store) => store.delete(session_id).await,
            SessionBackend::Memory(store) => store.delete(session_id).await,
        }
    }
}

/// Cookie signing key derived from `AUTH_SECRET`.
pub fn signing_key(secret: &str) -> Result<Key, AppError> {
    let digest = Sha512::digest(secret.as_bytes());
    Key::try_from(digest.as_slice())
        .map_err(|e| AppError::Session(format!("Invalid cookie signing key: {e}")))
}

/// Signed `cvsite_session` cookie, `SameSite=Lax`, expiring after `ttl` of inactivity.
pub type SessionLayer = SessionManagerLayer<SessionBackend, SignedCookie>;

pub fn session_layer(
    backend: SessionBackend,
    key: Key,
    ttl: Duration,
    secure: bool,
) -> Result<SessionLayer, AppError> {
    let expiry = Expiry::OnInactivity(
        ttl.try_into()
            .map_err(|e| AppError::Session(format!("Session lifetime out of range: {e}")))?,
    );
    Ok(SessionManagerLayer::new(backend)
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(expiry)
        .with_signed(key))
}

pub fn session_layer_from_config(
    backend: SessionBackend,
    config: &Config,
) -> Result<SessionLayer, AppError> {
    session_layer(
        backend,
        signing_key(&config.auth_secret)?,
        Duration::from_secs(config.session_ttl_secs),
        config.cookie_secure,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Request integration
// ────────────────────────────────────────────────────────────────────────────

/// The signed-in user, read from the request's [`Session`].
/// Extracting it in a handler rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    fn from_session(user: SessionUser, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            expires_at,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Session(msg.to_string()))?;

        // Store failures are logged and the request is treated as anonymous.
        let user = match session.get::<SessionUser>(USER_KEY).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Session lookup failed, continuing anonymously: {e}");
                None
            }
        };
        let user = user.ok_or(AppError::Unauthorized)?;

        let expires_at = DateTime::<Utc>::from_timestamp(session.expiry_date().unix_timestamp(), 0)
            .unwrap_or_else(Utc::now);
        Ok(AuthUser::from_session(user, expires_at))
    }
}
