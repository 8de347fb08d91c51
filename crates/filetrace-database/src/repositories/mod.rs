//! Repository implementations for all FileTrace entities.

pub mod audit;
pub mod file;
pub mod share;
pub mod user;

pub use audit::AuditLogRepository;
pub use file::FileRepository;
pub use share::ShareGrantRepository;
pub use user::UserRepository;

use filetrace_core::error::{AppError, ErrorKind};

/// Map an sqlx error into the application taxonomy.
///
/// Unique violations become `Conflict`, pool exhaustion and connection
/// failures become `Unavailable` (retryable by the caller), everything
/// else is a plain `Database` error.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            AppError::with_source(
                ErrorKind::Conflict,
                format!("{context}: unique constraint violated ({constraint})"),
                e,
            )
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            AppError::with_source(ErrorKind::Unavailable, format!("{context}: store unreachable"), e)
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}
