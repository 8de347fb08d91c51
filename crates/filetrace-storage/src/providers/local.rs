//! Local filesystem object store.
//!
//! Objects live under a configured root directory; retrieval URLs point
//! into a static-file prefix expected to serve that directory. Meant for
//! development and single-node deployments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use filetrace_core::config::storage::LocalStorageConfig;
use filetrace_core::error::AppError;
use filetrace_core::result::AppResult;
use filetrace_core::traits::ObjectStore;

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Create the store, ensuring the root directory exists.
    pub async fn new(config: &LocalStorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a storage key to a path under the root, rejecting any key
    /// that would escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty()
            || Path::new(key)
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &'static str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(tokio::fs::metadata(&self.root).await.is_ok())
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // The local provider has no signing story; the TTL is advisory and
    // enforcement is left to whatever serves the directory.
    async fn retrieval_url(&self, key: &str, _expires_in: Duration) -> AppResult<String> {
        self.resolve(key)?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_in(dir: &Path) -> LocalObjectStore {
        LocalObjectStore::new(&LocalStorageConfig {
            root_path: dir.to_str().unwrap().to_string(),
            public_base_url: "http://localhost:8080/objects/".to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let key = "user-1/object-1";
        store.put(key, Bytes::from("hello world")).await.unwrap();
        assert!(dir.path().join(key).exists());

        store.delete(key).await.unwrap();
        assert!(!dir.path().join(key).exists());

        // Deleting a missing key is not an error.
        store.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_retrieval_url_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let url = store
            .retrieval_url("user-1/object-1", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/objects/user-1/object-1");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        assert!(store.put("../escape", Bytes::from("x")).await.is_err());
        assert!(store.put("", Bytes::from("x")).await.is_err());
    }
}
