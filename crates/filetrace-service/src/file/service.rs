//! File CRUD service.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use filetrace_core::error::AppError;
use filetrace_core::result::AppResult;
use filetrace_core::traits::ObjectStore;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_database::stores::{FileStore, ShareStore};
use filetrace_entity::audit::{AuditAction, CreateAuditLogEntry};
use filetrace_entity::file::{CreateStoredFile, StoredFile, UpdateStoredFile};

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Manages file records and their payloads in the object store.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File metadata store.
    file_store: Arc<dyn FileStore>,
    /// Share grant store, for cutting off sharing on delete.
    share_store: Arc<dyn ShareStore>,
    /// Binary payload collaborator.
    object_store: Arc<dyn ObjectStore>,
    /// Audit trail.
    audit: AuditService,
    /// Lifetime of issued retrieval URLs.
    download_url_ttl: Duration,
}

/// Request to upload a new file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File name (including extension).
    pub name: String,
    /// Category label.
    pub category: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// The payload.
    pub data: Bytes,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        file_store: Arc<dyn FileStore>,
        share_store: Arc<dyn ShareStore>,
        object_store: Arc<dyn ObjectStore>,
        audit: AuditService,
        download_url_ttl: Duration,
    ) -> Self {
        Self {
            file_store,
            share_store,
            object_store,
            audit,
            download_url_ttl,
        }
    }

    /// Uploads a file: payload to the object store, metadata to the
    /// database, one `file.upload` audit entry.
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> AppResult<StoredFile> {
        validate_name(&req.name)?;

        let storage_key = format!("{}/{}", ctx.user_id, Uuid::new_v4());
        let size_bytes = req.data.len() as i64;

        self.object_store.put(&storage_key, req.data).await?;

        let file = self
            .file_store
            .create(&CreateStoredFile {
                owner_id: ctx.user_id,
                name: req.name,
                category: req.category,
                mime_type: req.mime_type,
                size_bytes,
                storage_key,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            size_bytes,
            "File uploaded"
        );

        self.audit
            .record_best_effort(CreateAuditLogEntry::for_actor(
                AuditAction::FileUpload,
                Some(file.id),
                ctx.user_id,
                ctx.username.clone(),
                ctx.source_address.clone(),
                Some(json!({ "name": file.name, "size_bytes": size_bytes })),
            ))
            .await;

        Ok(file)
    }

    /// Gets a file the caller owns.
    pub async fn get(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<StoredFile> {
        self.owned_file(ctx, file_id).await
    }

    /// Lists the caller's files, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<StoredFile>> {
        self.file_store.list_by_owner(ctx.user_id, &page).await
    }

    /// Renames or recategorizes a file the caller owns.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        changes: UpdateStoredFile,
    ) -> AppResult<StoredFile> {
        let before = self.owned_file(ctx, file_id).await?;

        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        if changes.name.is_none() && changes.category.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }

        let updated = self
            .file_store
            .update(file_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        info!(user_id = %ctx.user_id, file_id = %file_id, "File updated");

        self.audit
            .record_best_effort(CreateAuditLogEntry::for_actor(
                AuditAction::FileRename,
                Some(file_id),
                ctx.user_id,
                ctx.username.clone(),
                ctx.source_address.clone(),
                Some(json!({
                    "from_name": before.name,
                    "name": updated.name,
                    "category": updated.category,
                })),
            ))
            .await;

        Ok(updated)
    }

    /// Deletes a file the caller owns: cuts off all sharing, removes the
    /// record (grants cascade with it), and drops the payload.
    pub async fn delete(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.owned_file(ctx, file_id).await?;

        let revoked = self.share_store.revoke_all_for_resource(file_id).await?;
        self.file_store.delete(file_id).await?;

        // The record is already gone; the payload delete is best-effort.
        if let Err(e) = self.object_store.delete(&file.storage_key).await {
            warn!(
                file_id = %file_id,
                storage_key = %file.storage_key,
                error = %e,
                "Failed to delete object payload"
            );
        }

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            revoked_grants = revoked,
            "File deleted"
        );

        self.audit
            .record_best_effort(CreateAuditLogEntry::for_actor(
                AuditAction::FileDelete,
                Some(file_id),
                ctx.user_id,
                ctx.username.clone(),
                ctx.source_address.clone(),
                Some(json!({ "name": file.name, "revoked_grants": revoked })),
            ))
            .await;

        Ok(())
    }

    /// Issues a retrieval URL for a file the caller owns.
    pub async fn download_url(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<String> {
        let file = self.owned_file(ctx, file_id).await?;

        let url = self
            .object_store
            .retrieval_url(&file.storage_key, self.download_url_ttl)
            .await?;

        self.audit
            .record_best_effort(CreateAuditLogEntry::for_actor(
                AuditAction::FileDownload,
                Some(file_id),
                ctx.user_id,
                ctx.username.clone(),
                ctx.source_address.clone(),
                Some(json!({ "name": file.name })),
            ))
            .await;

        Ok(url)
    }

    /// Issues a retrieval URL for a file reached through a share grant.
    pub async fn shared_download_url(&self, file: &StoredFile) -> AppResult<String> {
        self.object_store
            .retrieval_url(&file.storage_key, self.download_url_ttl)
            .await
    }

    async fn owned_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<StoredFile> {
        let file = self
            .file_store
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if file.owner_id != ctx.user_id {
            return Err(AppError::forbidden("You can only manage your own files"));
        }
        Ok(file)
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.len() > 255 {
        return Err(AppError::validation(
            "File name must be between 1 and 255 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, ctx_for};
    use filetrace_core::error::ErrorKind;

    fn upload_named(name: &str) -> UploadRequest {
        UploadRequest {
            name: name.to_string(),
            category: Some("reports".to_string()),
            mime_type: Some("text/plain".to_string()),
            data: Bytes::from_static(b"payload bytes"),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_payload_and_audits() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let service = h.file_service();

        let file = service
            .upload(&ctx_for(&alice), upload_named("notes.txt"))
            .await
            .expect("upload");

        assert_eq!(file.size_bytes, 13);
        assert!(h.object_store.contains(&file.storage_key));

        let entry = h.audit_store.last_entry().expect("upload entry");
        assert_eq!(entry.action, AuditAction::FileUpload);
        assert_eq!(entry.resource_id, Some(file.id));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_name() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");

        let err = h
            .file_service()
            .upload(&ctx_for(&alice), upload_named(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_rename_audits_old_and_new_name() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let service = h.file_service();
        let ctx = ctx_for(&alice);

        let file = service.upload(&ctx, upload_named("draft.txt")).await.expect("upload");
        let updated = service
            .update(
                &ctx,
                file.id,
                UpdateStoredFile {
                    name: Some("final.txt".to_string()),
                    category: None,
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.name, "final.txt");
        assert_eq!(updated.category.as_deref(), Some("reports"));

        let entry = h.audit_store.last_entry().expect("rename entry");
        assert_eq!(entry.action, AuditAction::FileRename);
        assert_eq!(entry.details.as_ref().unwrap()["from_name"], "draft.txt");
        assert_eq!(entry.details.as_ref().unwrap()["name"], "final.txt");
    }

    #[tokio::test]
    async fn test_delete_revokes_grants_and_drops_payload() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let service = h.file_service();
        let ctx = ctx_for(&alice);

        let file = service.upload(&ctx, upload_named("secret.txt")).await.expect("upload");
        h.seed_link_grant(&alice, &file, None, Some(5));
        h.seed_link_grant(&alice, &file, None, Some(5));

        service.delete(&ctx, file.id).await.expect("delete");

        assert!(!h.object_store.contains(&file.storage_key));
        assert!(
            h.file_service().get(&ctx, file.id).await.is_err(),
            "record is gone"
        );

        let entry = h.audit_store.last_entry().expect("delete entry");
        assert_eq!(entry.action, AuditAction::FileDelete);
        assert_eq!(entry.details.as_ref().unwrap()["revoked_grants"], 2);
    }

    #[tokio::test]
    async fn test_foreign_file_is_forbidden() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let mallory = h.seed_user("mallory");
        let service = h.file_service();

        let file = service
            .upload(&ctx_for(&alice), upload_named("mine.txt"))
            .await
            .expect("upload");

        let err = service.get(&ctx_for(&mallory), file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        let err = service.delete(&ctx_for(&mallory), file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_owner_download_issues_url_and_audits() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let service = h.file_service();
        let ctx = ctx_for(&alice);

        let file = service.upload(&ctx, upload_named("report.pdf")).await.expect("upload");
        let url = service.download_url(&ctx, file.id).await.expect("url");
        assert!(url.contains(&file.storage_key));

        let entry = h.audit_store.last_entry().expect("download entry");
        assert_eq!(entry.action, AuditAction::FileDownload);
        assert_eq!(entry.actor_username.as_deref(), Some("alice"));
    }
}
