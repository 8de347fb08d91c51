//! Store traits the service layer depends on.
//!
//! The traits are defined here and implemented by the repositories in this
//! crate; the service crate holds `Arc<dyn …>` handles so its scenario
//! tests can substitute in-memory stores.

use async_trait::async_trait;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use filetrace_entity::file::{CreateStoredFile, StoredFile, UpdateStoredFile};
use filetrace_entity::share::{CreateShareGrant, ShareGrant};
use filetrace_entity::user::User;

/// Persistence and atomic mutation of share grants.
///
/// Every mutation is a single field-scoped update issued to the store —
/// never fetch-modify-write, which would reintroduce the lost-update race
/// on the access counter.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new grant. Uniqueness violations (duplicate token, or a
    /// second active user-grant for the same `(resource, recipient)` pair)
    /// surface as `Conflict`.
    async fn create(&self, data: &CreateShareGrant) -> AppResult<ShareGrant>;

    /// Find a grant by ID. Absence is `Ok(None)`, not an error.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareGrant>>;

    /// Exact-match token lookup. Returns revoked and expired grants too,
    /// so denial handling can still name the resource.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareGrant>>;

    /// All grants for a resource, newest-created first, unfiltered.
    async fn list_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<ShareGrant>>;

    /// Deactivate one grant. Returns `false` when the grant was already
    /// inactive or absent (idempotent).
    async fn revoke(&self, id: Uuid) -> AppResult<bool>;

    /// Deactivate every active grant for a resource; returns the count.
    async fn revoke_all_for_resource(&self, resource_id: Uuid) -> AppResult<u64>;

    /// Atomically add one to `access_count` and refresh `updated_at`;
    /// returns the new count.
    async fn increment_access(&self, id: Uuid) -> AppResult<i32>;
}

/// Append-only audit log persistence.
///
/// No update or delete is exposed, by design.
#[async_trait]
pub trait AuditStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append one entry.
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Entries for a resource, newest first, ties broken by insertion order.
    async fn list_by_resource(
        &self,
        resource_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

/// Stored file metadata persistence.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new file record.
    async fn create(&self, data: &CreateStoredFile) -> AppResult<StoredFile>;

    /// Find a file by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StoredFile>>;

    /// Files owned by a user, newest first.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StoredFile>>;

    /// Apply the given changes; returns the updated record, `None` when
    /// the file is absent.
    async fn update(&self, id: Uuid, changes: &UpdateStoredFile)
    -> AppResult<Option<StoredFile>>;

    /// Delete a file record (share grants cascade). Returns `true` when a
    /// row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// User identity lookups.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by login name.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}
