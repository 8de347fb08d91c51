//! Request context carrying the authenticated identity and client metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the API layer from verified token claims and passed into
/// service methods so that every operation knows *who* is acting and
/// from *where*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The username at token-issuance time.
    pub username: String,
    /// Network address of the request origin.
    pub source_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        username: String,
        source_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username,
            source_address,
            user_agent,
            request_time: Utc::now(),
        }
    }
}

/// Client metadata for unauthenticated (token-bearing) requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Network address of the request origin.
    pub source_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}
