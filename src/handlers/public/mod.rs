// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: tracing, request id, CORS only

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub mod auth;

/// GET / - Service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Notebook API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-user notebooks and notes with JWT sessions",
            "endpoints": {
                "auth": "/register, /login, /refresh-token, /logout (public)",
                "account": "/me, /me/username (protected)",
                "notebooks": "/notebooks[/:id[/name|/notes|/export]] (protected)",
                "notes": "/notes[/:id[/export]] (protected)",
                "health": "/health (public)"
            }
        }
    }))
}

/// GET /health - Liveness plus store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "status": "ok", "store": "ok" } })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Store unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
