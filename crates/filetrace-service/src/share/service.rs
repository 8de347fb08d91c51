//! Share grant CRUD service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use filetrace_core::error::{AppError, ErrorKind};
use filetrace_core::result::AppResult;
use filetrace_database::stores::{FileStore, ShareStore, UserStore};
use filetrace_entity::audit::{AuditAction, CreateAuditLogEntry};
use filetrace_entity::file::StoredFile;
use filetrace_entity::share::{
    CreateShareGrant, ShareGrant, ShareGrantSummary, ShareKind, ShareLink,
};
use filetrace_entity::user::User;

use super::link::LinkService;
use crate::audit::AuditService;
use crate::context::RequestContext;

/// Shortest accepted expiration window.
pub const MIN_EXPIRATION_MINUTES: i64 = 10;
/// Longest accepted expiration window (one year).
pub const MAX_EXPIRATION_MINUTES: i64 = 525_960;

/// How many times a link-grant insert is retried with a fresh token when
/// the store reports a token collision. Collisions are not expected at
/// this token length; the retry exists purely as a backstop.
const TOKEN_RETRY_ATTEMPTS: u32 = 3;

/// Manages share grant creation, listing, and revocation.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Share grant store.
    share_store: Arc<dyn ShareStore>,
    /// File store, for ownership checks.
    file_store: Arc<dyn FileStore>,
    /// User store, for recipient resolution.
    user_store: Arc<dyn UserStore>,
    /// Link token generation.
    links: LinkService,
    /// Audit trail.
    audit: AuditService,
}

/// Request to create a new share grant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateShareRequest {
    /// File to share.
    pub resource_id: Uuid,
    /// Recipient kind.
    pub kind: ShareKind,
    /// Recipient login name (user grants only).
    pub recipient_username: Option<String>,
    /// Minutes until expiry (`None` = no time limit).
    pub expiration_minutes: Option<i64>,
    /// Access ceiling (`None` = no count limit).
    pub max_access_count: Option<i32>,
}

/// A freshly created share grant with its kind-specific companion data.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedShare {
    /// The grant record.
    pub grant: ShareGrant,
    /// Shareable URL (link grants).
    pub link: Option<ShareLink>,
    /// Resolved recipient (user grants).
    pub recipient: Option<User>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        share_store: Arc<dyn ShareStore>,
        file_store: Arc<dyn FileStore>,
        user_store: Arc<dyn UserStore>,
        links: LinkService,
        audit: AuditService,
    ) -> Self {
        Self {
            share_store,
            file_store,
            user_store,
            links,
            audit,
        }
    }

    /// Creates a new share grant for a file the caller owns.
    pub async fn create_share(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> AppResult<CreatedShare> {
        let file = self.owned_file(ctx, req.resource_id).await?;

        if let Some(minutes) = req.expiration_minutes {
            if !(MIN_EXPIRATION_MINUTES..=MAX_EXPIRATION_MINUTES).contains(&minutes) {
                return Err(AppError::validation(format!(
                    "expiration_minutes must be between {MIN_EXPIRATION_MINUTES} and {MAX_EXPIRATION_MINUTES}"
                )));
            }
        }
        if let Some(max) = req.max_access_count {
            if max < 1 {
                return Err(AppError::validation("max_access_count must be positive"));
            }
        }

        let base = CreateShareGrant {
            resource_id: file.id,
            grantor_id: ctx.user_id,
            kind: req.kind,
            token: None,
            recipient_id: None,
            expires_at: req
                .expiration_minutes
                .map(|minutes| Utc::now() + Duration::minutes(minutes)),
            max_access_count: req.max_access_count,
        };
        if !base.is_constrained() {
            return Err(AppError::validation(
                "A share needs an expiration time or an access limit",
            ));
        }

        let (grant, recipient) = match req.kind {
            ShareKind::Link => {
                let grant = self.create_link_grant(base).await?;
                (grant, None)
            }
            ShareKind::User => {
                let recipient = self.resolve_recipient(req.recipient_username.as_deref()).await?;
                let grant = self
                    .share_store
                    .create(&CreateShareGrant {
                        recipient_id: Some(recipient.id),
                        ..base
                    })
                    .await
                    .map_err(|e| match e.kind {
                        ErrorKind::Conflict => {
                            AppError::conflict("File is already shared with this user")
                        }
                        _ => e,
                    })?;
                (grant, Some(recipient))
            }
        };

        info!(
            user_id = %ctx.user_id,
            grant_id = %grant.id,
            resource_id = %grant.resource_id,
            kind = ?grant.kind,
            "Share grant created"
        );

        self.audit
            .record_best_effort(CreateAuditLogEntry::for_actor(
                AuditAction::ShareCreate,
                Some(grant.resource_id),
                ctx.user_id,
                ctx.username.clone(),
                ctx.source_address.clone(),
                Some(json!({
                    "grant_id": grant.id,
                    "kind": grant.kind,
                    "expires_at": grant.expires_at,
                    "max_access_count": grant.max_access_count,
                    "recipient_id": grant.recipient_id,
                })),
            ))
            .await;

        let link = matches!(grant.kind, ShareKind::Link).then(|| self.links.build_link(&grant));

        Ok(CreatedShare {
            grant,
            link,
            recipient,
        })
    }

    /// Lists grants for a file the caller owns.
    ///
    /// The default view keeps only grants that currently pass the validity
    /// evaluation; `include_inactive` widens it to the full history for
    /// management views.
    pub async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<ShareGrantSummary>> {
        self.owned_file(ctx, resource_id).await?;

        let now = Utc::now();
        let grants = self.share_store.list_by_resource(resource_id).await?;
        Ok(grants
            .into_iter()
            .filter(|grant| include_inactive || grant.is_valid_at(now))
            .map(ShareGrantSummary::from)
            .collect())
    }

    /// Revokes (deactivates) one grant the caller created.
    ///
    /// Idempotent: revoking an already-inactive grant returns `false`
    /// rather than an error.
    pub async fn revoke(&self, ctx: &RequestContext, grant_id: Uuid) -> AppResult<bool> {
        let grant = self
            .share_store
            .find_by_id(grant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share grant not found"))?;

        if grant.grantor_id != ctx.user_id {
            return Err(AppError::forbidden("You can only revoke your own shares"));
        }

        let changed = self.share_store.revoke(grant_id).await?;

        if changed {
            info!(user_id = %ctx.user_id, grant_id = %grant_id, "Share grant revoked");
            self.audit
                .record_best_effort(CreateAuditLogEntry::for_actor(
                    AuditAction::ShareRevoke,
                    Some(grant.resource_id),
                    ctx.user_id,
                    ctx.username.clone(),
                    ctx.source_address.clone(),
                    Some(json!({ "grant_id": grant_id })),
                ))
                .await;
        }

        Ok(changed)
    }

    /// Revokes every active grant for a file the caller owns; returns the
    /// number of grants deactivated.
    pub async fn revoke_all_for_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
    ) -> AppResult<u64> {
        self.owned_file(ctx, resource_id).await?;

        let revoked = self.share_store.revoke_all_for_resource(resource_id).await?;

        if revoked > 0 {
            info!(
                user_id = %ctx.user_id,
                resource_id = %resource_id,
                revoked,
                "All share grants revoked for resource"
            );
            self.audit
                .record_best_effort(CreateAuditLogEntry::for_actor(
                    AuditAction::ShareRevoke,
                    Some(resource_id),
                    ctx.user_id,
                    ctx.username.clone(),
                    ctx.source_address.clone(),
                    Some(json!({ "revoked": revoked })),
                ))
                .await;
        }

        Ok(revoked)
    }

    async fn create_link_grant(&self, base: CreateShareGrant) -> AppResult<ShareGrant> {
        // The store's unique token index is the collision backstop; a
        // conflict just means generating again.
        for _ in 0..TOKEN_RETRY_ATTEMPTS {
            let result = self
                .share_store
                .create(&CreateShareGrant {
                    token: Some(self.links.generate_token()),
                    ..base.clone()
                })
                .await;

            match result {
                Err(e) if e.kind == ErrorKind::Conflict => continue,
                other => return other,
            }
        }
        Err(AppError::internal(
            "Could not allocate a unique share token",
        ))
    }

    async fn resolve_recipient(&self, username: Option<&str>) -> AppResult<User> {
        let username = username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::validation("recipient_username is required for user shares"))?;
        self.user_store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unknown recipient: {username}")))
    }

    async fn owned_file(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<StoredFile> {
        let file = self
            .file_store
            .find_by_id(resource_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if file.owner_id != ctx.user_id {
            return Err(AppError::forbidden("You can only share your own files"));
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestHarness, ctx_for};
    use filetrace_core::types::pagination::PageRequest;
    use filetrace_database::stores::{AuditStore, ShareStore};

    fn link_request(resource_id: Uuid, minutes: Option<i64>, max: Option<i32>) -> CreateShareRequest {
        CreateShareRequest {
            resource_id,
            kind: ShareKind::Link,
            recipient_username: None,
            expiration_minutes: minutes,
            max_access_count: max,
        }
    }

    #[tokio::test]
    async fn test_create_link_share_returns_token_and_url() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);

        let created = h
            .share_service()
            .create_share(&ctx_for(&alice), link_request(file.id, Some(60), None))
            .await
            .expect("create share");

        let link = created.link.expect("link grant carries a link");
        assert_eq!(link.token.len(), 64);
        assert!(link.url.ends_with(&link.token));
        assert_eq!(created.grant.access_count, 0);
        assert!(created.grant.is_active);
    }

    #[tokio::test]
    async fn test_create_without_any_limit_rejected() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);

        let err = h
            .share_service()
            .create_share(&ctx_for(&alice), link_request(file.id, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_with_out_of_range_expiration_rejected() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let service = h.share_service();
        let ctx = ctx_for(&alice);

        for minutes in [0, -5, 9, MAX_EXPIRATION_MINUTES + 1] {
            let err = service
                .create_share(&ctx, link_request(file.id, Some(minutes), None))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "minutes = {minutes}");
        }
    }

    #[tokio::test]
    async fn test_create_with_nonpositive_cap_rejected() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);

        let err = h
            .share_service()
            .create_share(&ctx_for(&alice), link_request(file.id, None, Some(0)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_user_share_conflicts() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let bob = h.seed_user("bob");
        let file = h.seed_file(&alice);
        let service = h.share_service();
        let ctx = ctx_for(&alice);

        let request = CreateShareRequest {
            resource_id: file.id,
            kind: ShareKind::User,
            recipient_username: Some(bob.username.clone()),
            expiration_minutes: None,
            max_access_count: Some(5),
        };

        let first = service.create_share(&ctx, request.clone()).await.expect("first share");
        assert_eq!(first.grant.recipient_id, Some(bob.id));
        assert_eq!(first.recipient.as_ref().map(|u| u.id), Some(bob.id));

        let err = service.create_share(&ctx, request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_sharing_someone_elses_file_forbidden() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let mallory = h.seed_user("mallory");
        let file = h.seed_file(&alice);

        let err = h
            .share_service()
            .create_share(&ctx_for(&mallory), link_request(file.id, Some(60), None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let service = h.share_service();
        let ctx = ctx_for(&alice);

        let created = service
            .create_share(&ctx, link_request(file.id, Some(60), None))
            .await
            .expect("create");

        assert!(service.revoke(&ctx, created.grant.id).await.expect("first revoke"));
        assert!(!service.revoke(&ctx, created.grant.id).await.expect("second revoke"));

        let all = service
            .list_for_resource(&ctx, file.id, true)
            .await
            .expect("list all");
        assert!(!all[0].grant.is_active);
    }

    #[tokio::test]
    async fn test_revoke_all_counts_only_active_grants() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let service = h.share_service();
        let ctx = ctx_for(&alice);

        let mut ids = Vec::new();
        for _ in 0..4 {
            let created = service
                .create_share(&ctx, link_request(file.id, Some(60), None))
                .await
                .expect("create");
            ids.push(created.grant.id);
        }
        assert!(service.revoke(&ctx, ids[0]).await.expect("pre-revoke one"));

        let revoked = service
            .revoke_all_for_resource(&ctx, file.id)
            .await
            .expect("revoke all");
        assert_eq!(revoked, 3);

        let active = service
            .list_for_resource(&ctx, file.id, false)
            .await
            .expect("list active");
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_active_listing_reports_remaining_accesses() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);
        let service = h.share_service();
        let ctx = ctx_for(&alice);

        let created = service
            .create_share(&ctx, link_request(file.id, None, Some(10)))
            .await
            .expect("create");
        for _ in 0..7 {
            h.share_store.increment_access(created.grant.id).await.expect("increment");
        }

        let active = service
            .list_for_resource(&ctx, file.id, false)
            .await
            .expect("list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].remaining_accesses, Some(3));
    }

    #[tokio::test]
    async fn test_create_share_is_audited() {
        let h = TestHarness::new();
        let alice = h.seed_user("alice");
        let file = h.seed_file(&alice);

        h.share_service()
            .create_share(&ctx_for(&alice), link_request(file.id, Some(60), None))
            .await
            .expect("create");

        let entries = h
            .audit_store
            .list_by_resource(file.id, &PageRequest::default())
            .await
            .expect("audit entries");
        assert_eq!(entries.items.len(), 1);
        assert_eq!(entries.items[0].action, AuditAction::ShareCreate);
        assert_eq!(entries.items[0].actor_username.as_deref(), Some("alice"));
    }
}
