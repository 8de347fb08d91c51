//! FileTrace server — file upload, sharing, and audit trail.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use filetrace_api::router::build_router;
use filetrace_api::state::AppState;
use filetrace_auth::JwtDecoder;
use filetrace_core::config::AppConfig;
use filetrace_core::error::AppError;
use filetrace_database::DatabasePool;
use filetrace_database::repositories::{
    AuditLogRepository, FileRepository, ShareGrantRepository, UserRepository,
};
use filetrace_database::stores::{AuditStore, FileStore, ShareStore, UserStore};
use filetrace_service::audit::AuditService;
use filetrace_service::file::FileService;
use filetrace_service::share::{AccessService, LinkService, ShareService};

#[tokio::main]
async fn main() {
    let env = std::env::var("FILETRACE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileTrace v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    filetrace_database::migration::run_migrations(db.pool()).await?;

    // ── Object store ─────────────────────────────────────────────
    let object_store = filetrace_storage::build_object_store(&config.storage).await?;

    // ── Repositories ─────────────────────────────────────────────
    let share_store: Arc<dyn ShareStore> = Arc::new(ShareGrantRepository::new(db.pool().clone()));
    let audit_store: Arc<dyn AuditStore> = Arc::new(AuditLogRepository::new(db.pool().clone()));
    let file_store: Arc<dyn FileStore> = Arc::new(FileRepository::new(db.pool().clone()));
    let user_store: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.pool().clone()));

    // ── Services ─────────────────────────────────────────────────
    let audit_service = AuditService::new(audit_store);
    let links = LinkService::new(config.share.public_base_url.clone());

    let share_service = Arc::new(ShareService::new(
        share_store.clone(),
        file_store.clone(),
        user_store,
        links,
        audit_service.clone(),
    ));
    let access_service = Arc::new(AccessService::new(
        share_store.clone(),
        file_store.clone(),
        audit_service.clone(),
    ));
    let file_service = Arc::new(FileService::new(
        file_store,
        share_store,
        object_store.clone(),
        audit_service.clone(),
        Duration::from_secs(config.storage.download_url_ttl_seconds),
    ));

    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        db,
        object_store,
        jwt_decoder,
        share_service,
        access_service,
        file_service,
        audit_service: Arc::new(audit_service),
    };

    // ── Serve ────────────────────────────────────────────────────
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "FileTrace listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Resolves when the process receives Ctrl-C / SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
