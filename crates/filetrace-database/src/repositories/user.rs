//! User repository implementation.
//!
//! Lookups only — account lifecycle belongs to the authentication
//! collaborator.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use filetrace_core::result::AppResult;
use filetrace_entity::user::User;

use super::db_error;
use crate::stores::UserStore;

/// Repository for user identity lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user", e))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user by username", e))
    }
}
