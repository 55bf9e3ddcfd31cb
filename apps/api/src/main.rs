mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod inference;
mod models;
mod pages;
mod resume;
mod routes;
mod search;
mod state;
mod storage;
mod templates;
mod users;
mod websites;

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::session::{session_layer_from_config, RedisStore};
use crate::auth::SessionBackend;
use crate::config::Config;
use crate::db::create_pool;
use crate::inference::InferenceClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing required env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvsite API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize session store
    let sessions = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis session store initialized");
            SessionBackend::Redis(RedisStore::new(client))
        }
        None => {
            warn!("REDIS_URL is not set; sessions are kept in memory and lost on restart");
            SessionBackend::Memory(tower_sessions::MemoryStore::default())
        }
    };
    let session_layer = session_layer_from_config(sessions.clone(), &config)?;

    // Initialize S3 / MinIO
    let storage = Storage::from_config(&config).await;
    info!("S3 client initialized (bucket: {})", storage.bucket());

    // Initialize inference client
    let inference = InferenceClient::from_config(&config)?;
    if inference.is_configured() {
        info!("Inference client initialized ({})", inference.endpoint());
    } else {
        warn!("HUGGINGFACE_API_KEY is not set; AI endpoints will answer 503");
    }

    let state = AppState {
        db,
        sessions,
        storage,
        inference,
        config: config.clone(),
    };

    let app = build_router(state, session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
