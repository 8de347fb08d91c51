//! In-memory store implementations and a seeding harness for the
//! service-level scenario tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use filetrace_core::error::AppError;
use filetrace_core::result::AppResult;
use filetrace_core::traits::ObjectStore;
use filetrace_core::types::pagination::{PageRequest, PageResponse};
use filetrace_database::stores::{AuditStore, FileStore, ShareStore, UserStore};
use filetrace_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use filetrace_entity::file::{CreateStoredFile, StoredFile, UpdateStoredFile};
use filetrace_entity::share::{CreateShareGrant, ShareGrant, ShareKind};
use filetrace_entity::user::User;

use crate::audit::AuditService;
use crate::context::{ClientMeta, RequestContext};
use crate::file::FileService;
use crate::share::{AccessService, LinkService, ShareService};

/// Request context for a seeded user.
pub fn ctx_for(user: &User) -> RequestContext {
    RequestContext::new(
        user.id,
        user.username.clone(),
        "203.0.113.7".to_string(),
        Some("filetrace-tests".to_string()),
    )
}

/// Client metadata for anonymous token access.
pub fn client_meta() -> ClientMeta {
    ClientMeta {
        source_address: "198.51.100.20".to_string(),
        user_agent: Some("filetrace-tests".to_string()),
    }
}

/// All in-memory stores plus constructors for wired-up services.
pub struct TestHarness {
    pub share_store: Arc<MemoryShareStore>,
    pub audit_store: Arc<MemoryAuditStore>,
    pub file_store: Arc<MemoryFileStore>,
    pub user_store: Arc<MemoryUserStore>,
    pub object_store: Arc<MemoryObjectStore>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            share_store: Arc::new(MemoryShareStore::default()),
            audit_store: Arc::new(MemoryAuditStore::default()),
            file_store: Arc::new(MemoryFileStore::default()),
            user_store: Arc::new(MemoryUserStore::default()),
            object_store: Arc::new(MemoryObjectStore::default()),
        }
    }

    pub fn audit_service(&self) -> AuditService {
        AuditService::new(self.audit_store.clone())
    }

    pub fn share_service(&self) -> ShareService {
        ShareService::new(
            self.share_store.clone(),
            self.file_store.clone(),
            self.user_store.clone(),
            LinkService::new("http://localhost:8080/api/s"),
            self.audit_service(),
        )
    }

    pub fn access_service(&self) -> AccessService {
        AccessService::new(
            self.share_store.clone(),
            self.file_store.clone(),
            self.audit_service(),
        )
    }

    pub fn file_service(&self) -> FileService {
        FileService::new(
            self.file_store.clone(),
            self.share_store.clone(),
            self.object_store.clone(),
            self.audit_service(),
            Duration::from_secs(3600),
        )
    }

    pub fn seed_user(&self, username: &str) -> User {
        self.user_store.insert(username)
    }

    pub fn seed_file(&self, owner: &User) -> StoredFile {
        let now = Utc::now();
        let file = StoredFile {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            name: "seeded.txt".to_string(),
            category: None,
            mime_type: Some("text/plain".to_string()),
            size_bytes: 42,
            storage_key: format!("{}/{}", owner.id, Uuid::new_v4()),
            created_at: now,
            updated_at: now,
        };
        self.file_store.insert(file.clone());
        file
    }

    /// Inserts a link grant directly at the store layer (bypassing service
    /// validation, so tests can construct already-expired grants) and
    /// returns its token.
    pub fn seed_link_grant(
        &self,
        grantor: &User,
        file: &StoredFile,
        expires_at: Option<DateTime<Utc>>,
        max_access_count: Option<i32>,
    ) -> String {
        let token = LinkService::new("http://localhost:8080/api/s").generate_token();
        let now = Utc::now();
        self.share_store.insert(ShareGrant {
            id: Uuid::new_v4(),
            resource_id: file.id,
            grantor_id: grantor.id,
            kind: ShareKind::Link,
            token: Some(token.clone()),
            recipient_id: None,
            expires_at,
            max_access_count,
            access_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        token
    }
}

// ── Share store ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryShareStore {
    grants: Mutex<Vec<ShareGrant>>,
}

impl MemoryShareStore {
    pub fn insert(&self, grant: ShareGrant) {
        self.grants.lock().unwrap().push(grant);
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn create(&self, data: &CreateShareGrant) -> AppResult<ShareGrant> {
        let mut grants = self.grants.lock().unwrap();

        if let Some(token) = &data.token {
            if grants.iter().any(|g| g.token.as_ref() == Some(token)) {
                return Err(AppError::conflict("share_grants_token_key"));
            }
        }
        if data.kind == ShareKind::User
            && grants.iter().any(|g| {
                g.kind == ShareKind::User
                    && g.is_active
                    && g.resource_id == data.resource_id
                    && g.recipient_id == data.recipient_id
            })
        {
            return Err(AppError::conflict("share_grants_user_grant_key"));
        }

        let now = Utc::now();
        let grant = ShareGrant {
            id: Uuid::new_v4(),
            resource_id: data.resource_id,
            grantor_id: data.grantor_id,
            kind: data.kind,
            token: data.token.clone(),
            recipient_id: data.recipient_id,
            expires_at: data.expires_at,
            max_access_count: data.max_access_count,
            access_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        grants.push(grant.clone());
        Ok(grant)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShareGrant>> {
        Ok(self.grants.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareGrant>> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<ShareGrant>> {
        // Newest-created first: reverse insertion order.
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|g| g.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let mut grants = self.grants.lock().unwrap();
        match grants.iter_mut().find(|g| g.id == id && g.is_active) {
            Some(grant) => {
                grant.is_active = false;
                grant.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_resource(&self, resource_id: Uuid) -> AppResult<u64> {
        let mut grants = self.grants.lock().unwrap();
        let mut revoked = 0;
        for grant in grants
            .iter_mut()
            .filter(|g| g.resource_id == resource_id && g.is_active)
        {
            grant.is_active = false;
            grant.updated_at = Utc::now();
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn increment_access(&self, id: Uuid) -> AppResult<i32> {
        let mut grants = self.grants.lock().unwrap();
        let grant = grants
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::not_found("Share grant not found"))?;
        grant.access_count += 1;
        grant.updated_at = Utc::now();
        Ok(grant.access_count)
    }
}

// ── Audit store ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    pub fn entry_count(&self) -> u64 {
        self.entries.lock().unwrap().len() as u64
    }

    pub fn last_entry(&self) -> Option<AuditLogEntry> {
        self.entries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut entries = self.entries.lock().unwrap();
        let appended = AuditLogEntry {
            id: Uuid::new_v4(),
            seq: entries.len() as i64 + 1,
            resource_id: entry.resource_id,
            action: entry.action,
            actor_id: entry.actor_id,
            actor_username: entry.actor_username.clone(),
            source_address: entry.source_address.clone(),
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        entries.push(appended.clone());
        Ok(appended)
    }

    async fn list_by_resource(
        &self,
        resource_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut matching: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| e.resource_id == Some(resource_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

// ── File store ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<Vec<StoredFile>>,
}

impl MemoryFileStore {
    pub fn insert(&self, file: StoredFile) {
        self.files.lock().unwrap().push(file);
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn create(&self, data: &CreateStoredFile) -> AppResult<StoredFile> {
        let now = Utc::now();
        let file = StoredFile {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            category: data.category.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            storage_key: data.storage_key.clone(),
            created_at: now,
            updated_at: now,
        };
        self.files.lock().unwrap().push(file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<StoredFile>> {
        Ok(self.files.lock().unwrap().iter().find(|f| f.id == id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<StoredFile>> {
        let files = self.files.lock().unwrap();
        let matching: Vec<StoredFile> = files
            .iter()
            .rev()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateStoredFile,
    ) -> AppResult<Option<StoredFile>> {
        let mut files = self.files.lock().unwrap();
        let Some(file) = files.iter_mut().find(|f| f.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            file.name = name.clone();
        }
        if let Some(category) = &changes.category {
            file.category = Some(category.clone());
        }
        file.updated_at = Utc::now();
        Ok(Some(file.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        Ok(files.len() < before)
    }
}

// ── User store ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn insert(&self, username: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            display_name: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

// ── Object store ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn retrieval_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        Ok(format!("memory://{key}?ttl={}", expires_in.as_secs()))
    }
}
