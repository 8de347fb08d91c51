//! Share CRUD and public token access handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use filetrace_core::error::AppError;
use filetrace_entity::share::ShareKind;
use filetrace_service::share::AccessOutcome;

use crate::dto::request::{CreateShareRequest, ListSharesQuery};
use crate::dto::response::{
    PublicFileInfo, RevokedResponse, ShareDownloadResponse, SharePreviewResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo};
use crate::state::AppState;

/// One message for every public denial: unknown, expired, revoked, and
/// exhausted tokens are indistinguishable from the outside.
const DENIAL_MESSAGE: &str = "Share link is invalid or has expired";

/// POST /api/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateShareRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let kind = parse_share_kind(&req.kind)?;

    let created = state
        .share_service
        .create_share(
            &auth,
            filetrace_service::share::service::CreateShareRequest {
                resource_id: req.resource_id,
                kind,
                recipient_username: req.recipient_username,
                expiration_minutes: req.expiration_minutes,
                max_access_count: req.max_access_count,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": created })))
}

/// GET /api/files/{id}/shares
pub async fn list_file_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ListSharesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let shares = state
        .share_service
        .list_for_resource(&auth, id, query.include_inactive)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": shares })))
}

/// DELETE /api/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let changed = state.share_service.revoke(&auth, id).await?;
    let response = RevokedResponse {
        revoked: u64::from(changed),
    };
    Ok(Json(serde_json::json!({ "success": true, "data": response })))
}

/// DELETE /api/files/{id}/shares
pub async fn revoke_all_file_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let revoked = state.share_service.revoke_all_for_resource(&auth, id).await?;
    let response = RevokedResponse { revoked };
    Ok(Json(serde_json::json!({ "success": true, "data": response })))
}

/// GET /api/s/{token} — public share preview, no access consumed.
pub async fn preview_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let preview = state
        .access_service
        .preview_token(&token)
        .await?
        .ok_or_else(|| AppError::not_found(DENIAL_MESSAGE))?;

    let response = SharePreviewResponse::from(&preview);
    Ok(Json(serde_json::json!({ "success": true, "data": response })))
}

/// GET /api/s/{token}/download — public share download, consumes one access.
pub async fn download_share(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.access_service.redeem_token(&token, &client).await? {
        AccessOutcome::Granted { file, .. } => {
            let download_url = state.file_service.shared_download_url(&file).await?;
            let response = ShareDownloadResponse {
                download_url,
                file: PublicFileInfo::from(&file),
            };
            Ok(Json(serde_json::json!({ "success": true, "data": response })))
        }
        AccessOutcome::Denied => Err(AppError::not_found(DENIAL_MESSAGE).into()),
    }
}

fn parse_share_kind(s: &str) -> Result<ShareKind, AppError> {
    match s {
        "link" => Ok(ShareKind::Link),
        "user" => Ok(ShareKind::User),
        _ => Err(AppError::validation(format!("Invalid share kind: {s}"))),
    }
}
