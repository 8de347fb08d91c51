//! Access accounting — turns a presented token into either a granted
//! access (exactly one counter increment and one audit entry) or an
//! audited denial.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use filetrace_core::result::AppResult;
use filetrace_database::stores::{FileStore, ShareStore};
use filetrace_entity::audit::{AuditAction, CreateAuditLogEntry};
use filetrace_entity::file::StoredFile;
use filetrace_entity::share::{ShareGrant, ShareGrantSummary};

use crate::audit::AuditService;
use crate::context::ClientMeta;

/// Outcome of redeeming a share token.
#[derive(Debug)]
pub enum AccessOutcome {
    /// The grant was valid; the access has been counted and logged.
    Granted {
        /// The grant, with its post-increment access count.
        grant: ShareGrant,
        /// The shared file.
        file: StoredFile,
    },
    /// The token was unknown, revoked, expired, or exhausted. The caller
    /// must not learn which.
    Denied,
}

/// Metadata view of a share, for preview before consuming an access.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SharePreview {
    /// The grant with its remaining-access budget.
    pub grant: ShareGrantSummary,
    /// The shared file.
    pub file: StoredFile,
}

/// Coordinates validate → increment → log for token-based access.
#[derive(Debug, Clone)]
pub struct AccessService {
    /// Share grant store.
    share_store: Arc<dyn ShareStore>,
    /// File store.
    file_store: Arc<dyn FileStore>,
    /// Audit trail.
    audit: AuditService,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(
        share_store: Arc<dyn ShareStore>,
        file_store: Arc<dyn FileStore>,
        audit: AuditService,
    ) -> Self {
        Self {
            share_store,
            file_store,
            audit,
        }
    }

    /// Redeems a token for one access.
    ///
    /// Every call appends exactly one audit entry: `share.download` when
    /// the access is granted and counted, `share.denied` otherwise. The
    /// gating check and the pre-check in [`Self::preview_token`] are the
    /// same `is_valid_at` evaluation; between that check and the counter
    /// increment a concurrent request may also pass validation against a
    /// count limit — that bounded overshoot is accepted rather than
    /// serialized away.
    pub async fn redeem_token(
        &self,
        token: &str,
        client: &ClientMeta,
    ) -> AppResult<AccessOutcome> {
        let now = Utc::now();

        let mut grant = match self.share_store.find_by_token(token).await? {
            Some(grant) => grant,
            None => return self.deny(None, "unknown_token", client).await,
        };

        if !grant.is_valid_at(now) {
            let reason = denial_reason(&grant, now);
            return self.deny(Some(grant.resource_id), reason, client).await;
        }

        let Some(file) = self.file_store.find_by_id(grant.resource_id).await? else {
            // Dangling grant; the owning file should have cascaded it away.
            return self
                .deny(Some(grant.resource_id), "missing_resource", client)
                .await;
        };

        // Atomic add on the store; failures here surface as transient
        // errors and nothing has been logged yet.
        grant.access_count = self.share_store.increment_access(grant.id).await?;

        info!(
            grant_id = %grant.id,
            resource_id = %grant.resource_id,
            access_count = grant.access_count,
            "Share access granted"
        );

        // The increment stands even if this append fails; the gap is
        // tolerated and surfaced as a warning inside the audit service.
        self.audit
            .record_best_effort(CreateAuditLogEntry::anonymous(
                AuditAction::ShareDownload,
                Some(grant.resource_id),
                client.source_address.clone(),
                Some(json!({
                    "grant_id": grant.id,
                    "kind": grant.kind,
                    "access_count": grant.access_count,
                    "user_agent": client.user_agent,
                })),
            ))
            .await;

        Ok(AccessOutcome::Granted { grant, file })
    }

    /// Resolves a token to share + file metadata without consuming an
    /// access: no increment, no audit entry. Returns `None` whenever the
    /// redeeming path would deny.
    pub async fn preview_token(&self, token: &str) -> AppResult<Option<SharePreview>> {
        let now = Utc::now();

        let Some(grant) = self.share_store.find_by_token(token).await? else {
            return Ok(None);
        };
        if !grant.is_valid_at(now) {
            return Ok(None);
        }
        let Some(file) = self.file_store.find_by_id(grant.resource_id).await? else {
            return Ok(None);
        };

        Ok(Some(SharePreview {
            grant: ShareGrantSummary::from(grant),
            file,
        }))
    }

    // The denial entry is this path's only persistence effect, so a store
    // failure is surfaced to the caller instead of being swallowed.
    async fn deny(
        &self,
        resource_id: Option<uuid::Uuid>,
        reason: &'static str,
        client: &ClientMeta,
    ) -> AppResult<AccessOutcome> {
        info!(resource_id = ?resource_id, reason, "Share access denied");

        self.audit
            .record(CreateAuditLogEntry::anonymous(
                AuditAction::ShareDenied,
                resource_id,
                client.source_address.clone(),
                Some(json!({
                    "reason": reason,
                    "user_agent": client.user_agent,
                })),
            ))
            .await?;

        Ok(AccessOutcome::Denied)
    }
}

/// Names the first rule that failed, for the audit trail only — callers
/// are told nothing beyond the denial itself.
fn denial_reason(grant: &ShareGrant, now: DateTime<Utc>) -> &'static str {
    if !grant.is_active {
        "revoked"
    } else if grant.expires_at.is_some_and(|expires_at| now >= expires_at) {
        "expired"
    } else {
        "exhausted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, client_meta};
    use chrono::Duration;
    use filetrace_core::types::pagination::PageRequest;
    use filetrace_database::stores::{AuditStore, ShareStore};
    use filetrace_entity::share::{CreateShareGrant, ShareKind};

    impl AccessOutcome {
        fn granted(self) -> (ShareGrant, StoredFile) {
            match self {
                AccessOutcome::Granted { grant, file } => (grant, file),
                AccessOutcome::Denied => panic!("expected granted access"),
            }
        }

        fn is_denied(&self) -> bool {
            matches!(self, AccessOutcome::Denied)
        }
    }

    #[tokio::test]
    async fn test_count_limited_grant_exhausts_after_cap() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, None, Some(3));
        let access = h.access_service();

        for expected in 1..=3 {
            let (grant, granted_file) = access
                .redeem_token(&token, &client_meta())
                .await
                .expect("redeem")
                .granted();
            assert_eq!(grant.access_count, expected);
            assert_eq!(granted_file.id, file.id);
        }

        let fourth = access.redeem_token(&token, &client_meta()).await.expect("redeem");
        assert!(fourth.is_denied());

        let grants = h.share_store.list_by_resource(file.id).await.expect("grants");
        assert_eq!(grants[0].access_count, 3, "denied call must not increment");

        let entries = h
            .audit_store
            .list_by_resource(file.id, &PageRequest::default())
            .await
            .expect("audit");
        let downloads = entries
            .items
            .iter()
            .filter(|e| e.action == AuditAction::ShareDownload)
            .count();
        let denials = entries
            .items
            .iter()
            .filter(|e| e.action == AuditAction::ShareDenied)
            .count();
        assert_eq!((downloads, denials), (3, 1));
    }

    #[tokio::test]
    async fn test_expired_grant_denied_without_increment() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, Some(Utc::now() - Duration::minutes(1)), None);
        let access = h.access_service();

        let outcome = access.redeem_token(&token, &client_meta()).await.expect("redeem");
        assert!(outcome.is_denied());

        let grants = h.share_store.list_by_resource(file.id).await.expect("grants");
        assert_eq!(grants[0].access_count, 0);

        let entries = h
            .audit_store
            .list_by_resource(file.id, &PageRequest::default())
            .await
            .expect("audit");
        assert_eq!(entries.items.len(), 1);
        assert_eq!(entries.items[0].action, AuditAction::ShareDenied);
        assert_eq!(
            entries.items[0].details.as_ref().unwrap()["reason"],
            "expired"
        );
    }

    #[tokio::test]
    async fn test_unknown_token_denied_and_audited_without_resource() {
        let h = TestHarness::new();
        let access = h.access_service();

        let outcome = access
            .redeem_token(&"0".repeat(64), &client_meta())
            .await
            .expect("redeem");
        assert!(outcome.is_denied());

        let entry = h.audit_store.last_entry().expect("denial entry");
        assert_eq!(entry.action, AuditAction::ShareDenied);
        assert_eq!(entry.resource_id, None);
        assert_eq!(entry.details.as_ref().unwrap()["reason"], "unknown_token");
    }

    #[tokio::test]
    async fn test_revoked_grant_denied_with_resource_attached() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, None, Some(5));

        let grants = h.share_store.list_by_resource(file.id).await.expect("grants");
        h.share_store.revoke(grants[0].id).await.expect("revoke");

        let outcome = h
            .access_service()
            .redeem_token(&token, &client_meta())
            .await
            .expect("redeem");
        assert!(outcome.is_denied());

        let entry = h.audit_store.last_entry().expect("denial entry");
        assert_eq!(entry.resource_id, Some(file.id));
        assert_eq!(entry.details.as_ref().unwrap()["reason"], "revoked");
    }

    #[tokio::test]
    async fn test_every_redeem_call_appends_exactly_one_entry() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, None, Some(2));
        let access = h.access_service();

        for expected_total in 1..=4u64 {
            access.redeem_token(&token, &client_meta()).await.expect("redeem");
            assert_eq!(h.audit_store.entry_count(), expected_total);
        }
    }

    #[tokio::test]
    async fn test_preview_neither_increments_nor_audits() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, None, Some(10));
        let access = h.access_service();

        for _ in 0..7 {
            access.redeem_token(&token, &client_meta()).await.expect("redeem");
        }

        let preview = access
            .preview_token(&token)
            .await
            .expect("preview")
            .expect("valid share previews");
        assert_eq!(preview.grant.remaining_accesses, Some(3));
        assert_eq!(preview.file.id, file.id);

        let grants = h.share_store.list_by_resource(file.id).await.expect("grants");
        assert_eq!(grants[0].access_count, 7, "preview must not count as access");
        assert_eq!(h.audit_store.entry_count(), 7, "preview must not audit");
    }

    #[tokio::test]
    async fn test_preview_of_invalid_share_is_none() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let token = h.seed_link_grant(&alice, &file, Some(Utc::now() - Duration::minutes(1)), None);
        let access = h.access_service();

        assert!(access.preview_token(&token).await.expect("preview").is_none());
        assert!(access.preview_token("missing").await.expect("preview").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_never_lost() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        h.seed_link_grant(&alice, &file, None, Some(100));
        let grant_id = h.share_store.list_by_resource(file.id).await.expect("grants")[0].id;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let store = h.share_store.clone();
            tasks.spawn(async move { store.increment_access(grant_id).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.expect("join").expect("increment");
        }

        let grant = h
            .share_store
            .find_by_id(grant_id)
            .await
            .expect("find")
            .expect("grant");
        assert_eq!(grant.access_count, 20);
    }

    #[tokio::test]
    async fn test_user_grant_shares_the_same_validity_gate() {
        // Both variants flow through the one is_valid_at evaluation; a
        // user grant with a cap of one is terminal after one access.
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let bob = h.seed_user("bob");
        let file = h.seed_file(&alice);

        let grant = h
            .share_store
            .create(&CreateShareGrant {
                resource_id: file.id,
                grantor_id: alice.id,
                kind: ShareKind::User,
                token: None,
                recipient_id: Some(bob.id),
                expires_at: None,
                max_access_count: Some(1),
            })
            .await
            .expect("user grant");

        let count = h.share_store.increment_access(grant.id).await.expect("count");
        assert_eq!(count, 1);
        let refreshed = h
            .share_store
            .find_by_id(grant.id)
            .await
            .expect("find")
            .expect("grant");
        assert!(!refreshed.is_valid());
    }
}
