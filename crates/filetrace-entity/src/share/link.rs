//! Share link value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated share link for external access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    /// The grant ID.
    pub grant_id: Uuid,
    /// The full URL for accessing the share.
    pub url: String,
    /// The bearer token.
    pub token: String,
    /// When the link expires (if time-limited).
    pub expires_at: Option<DateTime<Utc>>,
    /// How many accesses the link allows (if count-limited).
    pub max_access_count: Option<i32>,
}
