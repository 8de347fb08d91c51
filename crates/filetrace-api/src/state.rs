//! Application state shared across all handlers.

use std::sync::Arc;

use filetrace_auth::JwtDecoder;
use filetrace_core::config::AppConfig;
use filetrace_core::traits::ObjectStore;
use filetrace_database::DatabasePool;
use filetrace_service::audit::AuditService;
use filetrace_service::file::FileService;
use filetrace_service::share::{AccessService, ShareService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheaply cloneable.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db: DatabasePool,
    /// Object store collaborator.
    pub object_store: Arc<dyn ObjectStore>,
    /// Access token decoder.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Share grant management.
    pub share_service: Arc<ShareService>,
    /// Token redemption and access accounting.
    pub access_service: Arc<AccessService>,
    /// File management.
    pub file_service: Arc<FileService>,
    /// Audit trail queries.
    pub audit_service: Arc<AuditService>,
}
