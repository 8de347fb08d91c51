//! Response DTOs for public endpoints.
//!
//! Owner-facing endpoints serialize entities directly; the public share
//! endpoints go through these types so internal fields (owner, storage
//! key) never leave the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filetrace_entity::file::StoredFile;
use filetrace_entity::share::ShareKind;
use filetrace_service::share::SharePreview;

/// Publicly visible file metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicFileInfo {
    /// File name.
    pub name: String,
    /// Category label.
    pub category: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
}

impl From<&StoredFile> for PublicFileInfo {
    fn from(file: &StoredFile) -> Self {
        Self {
            name: file.name.clone(),
            category: file.category.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes,
        }
    }
}

/// Publicly visible share metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicShareInfo {
    /// Recipient kind.
    pub kind: ShareKind,
    /// When the share expires (if time-limited).
    pub expires_at: Option<DateTime<Utc>>,
    /// Accesses left before the ceiling, `null` when uncapped.
    pub remaining_accesses: Option<i32>,
}

/// Response for the share preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePreviewResponse {
    /// The shared file.
    pub file: PublicFileInfo,
    /// The share itself.
    pub share: PublicShareInfo,
}

impl From<&SharePreview> for SharePreviewResponse {
    fn from(preview: &SharePreview) -> Self {
        Self {
            file: PublicFileInfo::from(&preview.file),
            share: PublicShareInfo {
                kind: preview.grant.grant.kind,
                expires_at: preview.grant.grant.expires_at,
                remaining_accesses: preview.grant.remaining_accesses,
            },
        }
    }
}

/// Response for the share download endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareDownloadResponse {
    /// Short-lived retrieval URL for the payload.
    pub download_url: String,
    /// The shared file.
    pub file: PublicFileInfo,
}

/// Response for revoke endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    /// Number of grants deactivated.
    pub revoked: u64,
}
