//! Audit trail handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use filetrace_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/files/{id}/audit — the file's event history, newest first.
pub async fn list_file_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Ownership gate; the audit store itself has no notion of callers.
    state.file_service.get(&auth, id).await?;

    let entries = state
        .audit_service
        .list_for_resource(id, &params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}
