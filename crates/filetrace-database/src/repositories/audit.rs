//! Audit log repository implementation.
//!
//! Append and query only — this repository deliberately exposes no update
//! or delete path.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use super::db_error;
use crate::stores::AuditStore;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log \
             (resource_id, action, actor_id, actor_username, source_address, details) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(entry.resource_id)
        .bind(entry.action)
        .bind(entry.actor_id)
        .bind(&entry.actor_username)
        .bind(&entry.source_address)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to append audit entry", e))
    }

    async fn list_by_resource(
        &self,
        resource_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count audit entries", e))?;

        // seq breaks created_at ties in insertion order.
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE resource_id = $1 \
             ORDER BY created_at DESC, seq DESC LIMIT $2 OFFSET $3",
        )
        .bind(resource_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list audit entries", e))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
