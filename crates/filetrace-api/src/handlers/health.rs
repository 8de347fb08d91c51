//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = state.db.health_check().await.unwrap_or(false);
    let storage = state.object_store.health_check().await.unwrap_or(false);

    Json(serde_json::json!({
        "status": if database && storage { "ok" } else { "degraded" },
        "database": database,
        "storage": storage,
    }))
}
