//! Stored file repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_entity::file::{CreateStoredFile, StoredFile, UpdateStoredFile};

use super::db_error;
use crate::stores::FileStore;

/// Repository for stored file metadata.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn create(&self, data: &CreateStoredFile) -> AppResult<StoredFile> {
        sqlx::query_as::<_, StoredFile>(
            "INSERT INTO files (owner_id, name, category, mime_type, size_bytes, storage_key) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.category)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.storage_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create file record", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StoredFile>> {
        sqlx::query_as::<_, StoredFile>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find file", e))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StoredFile>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to count files", e))?;

        let files = sqlx::query_as::<_, StoredFile>(
            "SELECT * FROM files WHERE owner_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list files", e))?;

        Ok(PageResponse::new(
            files,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateStoredFile,
    ) -> AppResult<Option<StoredFile>> {
        sqlx::query_as::<_, StoredFile>(
            "UPDATE files SET name = COALESCE($2, name), category = COALESCE($3, category), \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update file", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
