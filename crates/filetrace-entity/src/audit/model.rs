//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;

/// An immutable audit log entry recording an action.
///
/// Entries are append-only: no update or delete path exists anywhere in
/// the codebase for this entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// Monotonic insertion counter, used to break timestamp ties.
    pub seq: i64,
    /// The file the event concerns, when one can be named. Denied attempts
    /// against unknown tokens have no resource to point at.
    pub resource_id: Option<Uuid>,
    /// The action that was performed.
    pub action: AuditAction,
    /// The acting user, `None` for unauthenticated public access.
    pub actor_id: Option<Uuid>,
    /// Username snapshot at write time, so renamed or deleted accounts
    /// don't corrupt history.
    pub actor_username: Option<String>,
    /// Network address the request originated from.
    pub source_address: String,
    /// Action-specific structured payload (JSON).
    pub details: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The file the event concerns (if known).
    pub resource_id: Option<Uuid>,
    /// The action performed.
    pub action: AuditAction,
    /// The acting user (if authenticated).
    pub actor_id: Option<Uuid>,
    /// Username snapshot.
    pub actor_username: Option<String>,
    /// Source network address.
    pub source_address: String,
    /// Action-specific details.
    pub details: Option<serde_json::Value>,
}

impl CreateAuditLogEntry {
    /// Entry for an authenticated user action.
    pub fn for_actor(
        action: AuditAction,
        resource_id: Option<Uuid>,
        actor_id: Uuid,
        actor_username: impl Into<String>,
        source_address: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            resource_id,
            action,
            actor_id: Some(actor_id),
            actor_username: Some(actor_username.into()),
            source_address: source_address.into(),
            details,
        }
    }

    /// Entry for an unauthenticated public action (token-based access).
    pub fn anonymous(
        action: AuditAction,
        resource_id: Option<Uuid>,
        source_address: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            resource_id,
            action,
            actor_id: None,
            actor_username: None,
            source_address: source_address.into(),
            details,
        }
    }
}
