//! Share grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recipient kind of a share grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShareKind {
    /// A bearer-token link; anyone holding the token may access.
    Link,
    /// A grant bound to one recipient identity.
    User,
}

/// A grant authorizing access to a stored file.
///
/// Two variants share this shape, discriminated by [`ShareKind`]:
/// link grants carry `token`, user grants carry `recipient_id`. A grant
/// is never physically deleted; revocation flips `is_active` and keeps
/// the row for history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareGrant {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The shared file.
    pub resource_id: Uuid,
    /// The user who created the grant.
    pub grantor_id: Uuid,
    /// Recipient kind.
    pub kind: ShareKind,
    /// Bearer token (link grants only); 64 lowercase hex characters.
    pub token: Option<String>,
    /// Grantee identity (user grants only).
    pub recipient_id: Option<Uuid>,
    /// Absolute expiry time. `None` means no time limit.
    pub expires_at: Option<DateTime<Utc>>,
    /// Ceiling on successful accesses. `None` means no count limit.
    pub max_access_count: Option<i32>,
    /// Number of successful accesses so far. Never decremented or reset.
    pub access_count: i32,
    /// `false` once explicitly revoked.
    pub is_active: bool,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last mutated (access or revoke).
    pub updated_at: DateTime<Utc>,
}

impl ShareGrant {
    /// Check whether the grant is valid at the given instant.
    ///
    /// The grant must be active, not yet expired (the expiry instant itself
    /// is already invalid), and under its access ceiling (reaching the
    /// ceiling is terminal). Both the metadata preview and the accounted
    /// access path gate on this one method.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return false;
            }
        }
        if let Some(max) = self.max_access_count {
            if self.access_count >= max {
                return false;
            }
        }
        true
    }

    /// Check whether the grant is valid right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Accesses left before the ceiling, `None` when uncapped.
    ///
    /// Clamped to zero so a concurrent overshoot never reports negative.
    pub fn remaining_accesses(&self) -> Option<i32> {
        self.max_access_count
            .map(|max| (max - self.access_count).max(0))
    }
}

/// Data required to create a new share grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareGrant {
    /// The shared file.
    pub resource_id: Uuid,
    /// The user creating the grant.
    pub grantor_id: Uuid,
    /// Recipient kind.
    pub kind: ShareKind,
    /// Bearer token (link grants).
    pub token: Option<String>,
    /// Grantee identity (user grants).
    pub recipient_id: Option<Uuid>,
    /// Expiry time (`None` = no time limit).
    pub expires_at: Option<DateTime<Utc>>,
    /// Access ceiling (`None` = no count limit).
    pub max_access_count: Option<i32>,
}

impl CreateShareGrant {
    /// Whether at least one expiration method is present.
    ///
    /// An unconstrained, non-revocable grant is disallowed by policy; the
    /// service rejects creation when this returns `false`.
    pub fn is_constrained(&self) -> bool {
        self.expires_at.is_some() || self.max_access_count.is_some()
    }
}

/// A grant enriched with its derived remaining-access budget, as returned
/// by owner-facing listings.
#[derive(Debug, Clone, Serialize)]
pub struct ShareGrantSummary {
    /// The grant record.
    #[serde(flatten)]
    pub grant: ShareGrant,
    /// Accesses left before the ceiling, `None` when uncapped.
    pub remaining_accesses: Option<i32>,
}

impl From<ShareGrant> for ShareGrantSummary {
    fn from(grant: ShareGrant) -> Self {
        let remaining_accesses = grant.remaining_accesses();
        Self {
            grant,
            remaining_accesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_grant() -> ShareGrant {
        let now = Utc::now();
        ShareGrant {
            id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            grantor_id: Uuid::new_v4(),
            kind: ShareKind::Link,
            token: Some("ab".repeat(32)),
            recipient_id: None,
            expires_at: None,
            max_access_count: Some(5),
            access_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_when_under_both_limits() {
        let now = Utc::now();
        let mut grant = base_grant();
        grant.expires_at = Some(now + Duration::hours(1));
        grant.access_count = 4;
        assert!(grant.is_valid_at(now));
    }

    #[test]
    fn test_invalid_at_exact_expiry_instant() {
        let now = Utc::now();
        let mut grant = base_grant();
        grant.expires_at = Some(now);
        assert!(!grant.is_valid_at(now));
        assert!(grant.is_valid_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_invalid_when_count_reached() {
        let mut grant = base_grant();
        grant.access_count = 5;
        assert!(!grant.is_valid());
        grant.access_count = 4;
        assert!(grant.is_valid());
    }

    #[test]
    fn test_invalid_when_revoked_regardless_of_limits() {
        let mut grant = base_grant();
        grant.is_active = false;
        assert!(!grant.is_valid());
    }

    #[test]
    fn test_expiry_wins_over_remaining_count() {
        let now = Utc::now();
        let mut grant = base_grant();
        grant.expires_at = Some(now - Duration::minutes(11));
        grant.access_count = 0;
        assert!(!grant.is_valid_at(now));
    }

    #[test]
    fn test_remaining_accesses() {
        let mut grant = base_grant();
        grant.max_access_count = Some(10);
        grant.access_count = 7;
        assert_eq!(grant.remaining_accesses(), Some(3));

        grant.access_count = 12; // concurrent overshoot
        assert_eq!(grant.remaining_accesses(), Some(0));

        grant.max_access_count = None;
        assert_eq!(grant.remaining_accesses(), None);
    }

    #[test]
    fn test_kind_serde_representation() {
        assert_eq!(serde_json::to_string(&ShareKind::Link).unwrap(), "\"link\"");
        assert_eq!(serde_json::to_string(&ShareKind::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_create_is_constrained() {
        let create = CreateShareGrant {
            resource_id: Uuid::new_v4(),
            grantor_id: Uuid::new_v4(),
            kind: ShareKind::Link,
            token: Some("cd".repeat(32)),
            recipient_id: None,
            expires_at: None,
            max_access_count: None,
        };
        assert!(!create.is_constrained());

        let capped = CreateShareGrant {
            max_access_count: Some(1),
            ..create.clone()
        };
        assert!(capped.is_constrained());
    }
}
