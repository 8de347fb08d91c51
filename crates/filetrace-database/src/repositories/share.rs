//! Share grant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_entity::share::{CreateShareGrant, ShareGrant};

use super::db_error;
use crate::stores::ShareStore;

/// Repository for share grant CRUD and atomic mutation.
#[derive(Debug, Clone)]
pub struct ShareGrantRepository {
    pool: PgPool,
}

impl ShareGrantRepository {
    /// Create a new share grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for ShareGrantRepository {
    async fn create(&self, data: &CreateShareGrant) -> AppResult<ShareGrant> {
        sqlx::query_as::<_, ShareGrant>(
            "INSERT INTO share_grants \
             (resource_id, grantor_id, kind, token, recipient_id, expires_at, max_access_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.resource_id)
        .bind(data.grantor_id)
        .bind(data.kind)
        .bind(&data.token)
        .bind(data.recipient_id)
        .bind(data.expires_at)
        .bind(data.max_access_count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create share grant", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareGrant>> {
        sqlx::query_as::<_, ShareGrant>("SELECT * FROM share_grants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share grant", e))
    }

    // No is_active filter here: revoked and expired grants must still
    // resolve so a denied attempt can be tied to its resource.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareGrant>> {
        sqlx::query_as::<_, ShareGrant>("SELECT * FROM share_grants WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share grant by token", e))
    }

    async fn list_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<ShareGrant>> {
        sqlx::query_as::<_, ShareGrant>(
            "SELECT * FROM share_grants WHERE resource_id = $1 ORDER BY created_at DESC",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list share grants", e))
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE share_grants SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke share grant", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_resource(&self, resource_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE share_grants SET is_active = FALSE, updated_at = NOW() \
             WHERE resource_id = $1 AND is_active = TRUE",
        )
        .bind(resource_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke share grants for resource", e))?;
        Ok(result.rows_affected())
    }

    // Single atomic update; concurrent callers serialize on the row and
    // no increment is ever lost.
    async fn increment_access(&self, id: Uuid) -> AppResult<i32> {
        let row: (i32,) = sqlx::query_as(
            "UPDATE share_grants SET access_count = access_count + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING access_count",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to increment access count", e))?;
        Ok(row.0)
    }
}
