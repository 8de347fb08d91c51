//! S3-compatible object store with pre-signed retrieval URLs.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use filetrace_core::config::storage::S3StorageConfig;
use filetrace_core::error::AppError;
use filetrace_core::result::AppResult;
use filetrace_core::traits::ObjectStore;

/// S3-compatible object store (AWS, MinIO, and friends).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3 object store from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 bucket name is required"));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "filetrace-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            // Non-AWS endpoints (MinIO) need path-style addressing.
            builder = builder.endpoint_url(&config.endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &'static str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| true)
            .map_err(|e| {
                AppError::with_source(
                    filetrace_core::error::ErrorKind::Storage,
                    format!("S3 health check failed for bucket {}", self.bucket),
                    e,
                )
            })
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    filetrace_core::error::ErrorKind::Storage,
                    format!("Failed to store object {key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    filetrace_core::error::ErrorKind::Storage,
                    format!("Failed to delete object {key}"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn retrieval_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(
                filetrace_core::error::ErrorKind::Storage,
                "Invalid presigning expiry",
                e,
            )
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(
                    filetrace_core::error::ErrorKind::Storage,
                    format!("Failed to presign retrieval URL for {key}"),
                    e,
                )
            })?;

        Ok(presigned.uri().to_string())
    }
}
