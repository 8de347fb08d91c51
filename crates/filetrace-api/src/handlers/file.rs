//! File CRUD, upload, and download handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use filetrace_core::error::AppError;
use filetrace_entity::file::UpdateStoredFile;
use filetrace_service::file::UploadRequest;

use crate::dto::request::UpdateFileRequest;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/files — multipart upload with a `file` part and an optional
/// `category` text part.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut name = None;
    let mut category = None;
    let mut mime_type = None;
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                name = field.file_name().map(str::to_string);
                mime_type = field.content_type().map(str::to_string);
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read file payload: {e}"))
                })?);
            }
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read name field: {e}"))
                })?);
            }
            "category" => {
                category = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read category field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("A file part is required"))?;
    let name = name.ok_or_else(|| AppError::validation("A file name is required"))?;

    let file = state
        .file_service
        .upload(
            &auth,
            UploadRequest {
                name,
                category,
                mime_type,
                data,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .file_service
        .list(&auth, params.into_page_request())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.file_service.get(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// PATCH /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let file = state
        .file_service
        .update(
            &auth,
            id,
            UpdateStoredFile {
                name: req.name,
                category: req.category,
            },
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.file_service.delete(&auth, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "File deleted" } }),
    ))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let download_url = state.file_service.download_url(&auth, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "download_url": download_url } }),
    ))
}
