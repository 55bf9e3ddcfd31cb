use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::db;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvsite-api"
    }))
}

#[derive(Debug, Serialize)]
pub struct ConnectivityReport {
    pub success: bool,
    pub database: bool,
    pub sessions: bool,
    pub message: String,
}

impl ConnectivityReport {
    pub fn new(database: bool, sessions: bool, session_backend: &str) -> Self {
        let message = match (database, sessions) {
            (true, true) => format!("Database and {session_backend} session store are reachable"),
            (false, true) => "Database is unreachable".to_string(),
            (true, false) => format!("{session_backend} session store is unreachable"),
            (false, false) => {
                format!("Database and {session_backend} session store are unreachable")
            }
        };
        Self {
            success: database && sessions,
            database,
            sessions,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /api/supabase-test
///
/// Connectivity probe: a trivial query plus a session-store ping.
pub async fn connectivity_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ConnectivityReport>) {
    let (database, sessions) = tokio::join!(db::ping(&state.db), state.sessions.ping());
    if let Err(e) = &database {
        warn!("Connectivity probe: database check failed: {e}");
    }
    if let Err(e) = &sessions {
        warn!("Connectivity probe: session store check failed: {e}");
    }
    let report = ConnectivityReport::new(
        database.is_ok(),
        sessions.is_ok(),
        state.sessions.name(),
    );
    (report.status(), Json(report))
}
