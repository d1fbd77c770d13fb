use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "MathGenius API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Curriculum taxonomy, accounts and learning progress",
        "endpoints": {
            "auth": "/auth/self, /auth/signin, /auth/signup, /auth/signout",
            "curriculum": "/subjects, /topics, /subtopics, /modules, /concepts, /formulas, /exercises",
            "progress": "/progress, /exercises/:id/attempts",
            "relationships": "/concepts/:id/relationships, /concept-relationships/:id",
            "users": "/users, /users/profile, /users/profile/password",
            "docs": "/docs",
            "openapi": crate::docs::OPENAPI_PATH,
            "health": "/health",
        }
    }))
}

/// 200 when the store answers a ping, 503 otherwise
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Store reachable"), (status = 503, description = "Store unavailable")))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
