//! Object store provider selection.

use std::sync::Arc;

use tracing::info;

use filetrace_core::config::storage::StorageConfig;
use filetrace_core::error::AppError;
use filetrace_core::traits::ObjectStore;

use crate::providers::local::LocalObjectStore;
use crate::providers::s3::S3ObjectStore;

/// Build the configured object store provider.
pub async fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, AppError> {
    match config.provider.as_str() {
        "local" => {
            info!(root = %config.local.root_path, "Using local object store");
            let store = LocalObjectStore::new(&config.local).await?;
            Ok(Arc::new(store))
        }
        "s3" => {
            info!(bucket = %config.s3.bucket, region = %config.s3.region, "Using S3 object store");
            let store = S3ObjectStore::new(&config.s3).await?;
            Ok(Arc::new(store))
        }
        other => Err(AppError::configuration(format!(
            "Unknown storage provider: {other}"
        ))),
    }
}
