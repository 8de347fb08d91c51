//! Object store trait for pluggable binary payload backends.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for the object-store collaborator.
///
/// FileTrace keeps only file metadata in the database; binary payloads are
/// handed to an implementation of this trait, addressed by an opaque
/// storage key, and served back to clients through short-lived retrieval
/// URLs. The trait is defined here in `filetrace-core` and implemented in
/// `filetrace-storage`.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &'static str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store the payload under the given key, overwriting any existing object.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Delete the object at the given key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Issue a retrieval URL for the object that stays valid for `expires_in`.
    async fn retrieval_url(&self, key: &str, expires_in: Duration) -> AppResult<String>;
}
