//! Append and query historical events.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_database::stores::AuditStore;
use filetrace_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

/// Records and queries audit log entries.
///
/// The underlying store is append-only; this service adds the two write
/// disciplines the callers need: `record` for paths where the entry is
/// the operation's primary persistence effect, and `record_best_effort`
/// for entries appended after a mutation that must stand on its own.
#[derive(Debug, Clone)]
pub struct AuditService {
    /// Audit store.
    store: Arc<dyn AuditStore>,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Appends an entry, surfacing store failures to the caller.
    pub async fn record(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        self.store.append(&entry).await
    }

    /// Appends an entry after a mutation that already succeeded. A store
    /// failure here is a tolerated gap: the mutation stands and the
    /// omission is logged as a warning.
    pub async fn record_best_effort(&self, entry: CreateAuditLogEntry) {
        if let Err(e) = self.store.append(&entry).await {
            warn!(
                action = %entry.action,
                resource_id = ?entry.resource_id,
                error = %e,
                "Failed to append audit entry"
            );
        }
    }

    /// Entries for a resource, newest first.
    pub async fn list_for_resource(
        &self,
        resource_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.store.list_by_resource(resource_id, page).await
    }
}
