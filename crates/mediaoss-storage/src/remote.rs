use crate::backend::ObjectBackend;
use crate::keys;
use crate::placement::{Placement, Removal};
use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// API-backed bucket: files are staged locally and handed to the backend
#[derive(Clone)]
pub(crate) struct RemotePlacement {
    backend: Arc<dyn ObjectBackend>,
    bucket: String,
    staging_dir: PathBuf,
}

impl RemotePlacement {
    pub(crate) fn new(
        backend: Arc<dyn ObjectBackend>,
        bucket: String,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        RemotePlacement {
            backend,
            bucket,
            staging_dir: staging_dir.into(),
        }
    }

    async fn put_file(&self, key: &str, source: &Path, keep_source: bool) -> StorageResult<()> {
        let data = Bytes::from(fs::read(source).await?);
        let size = data.len();
        let start = std::time::Instant::now();

        let receipt = self
            .backend
            .put(&self.bucket, key, data)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload failed"
                );
            })?;

        if !keep_source {
            if let Err(e) = fs::remove_file(source).await {
                tracing::warn!(
                    error = %e,
                    source = %source.display(),
                    key = %key,
                    "Uploaded but failed to remove local source"
                );
            }
        }

        if receipt.key.is_empty() {
            return Err(StorageError::UploadFailed(
                "backend did not acknowledge the object key".to_string(),
            ));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(())
    }
}

#[async_trait]
impl Placement for RemotePlacement {
    fn is_mount(&self) -> bool {
        false
    }

    async fn write_bytes(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let staged = self.staging_dir.join(keys::staging_name(key));
        fs::write(&staged, &data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to stage {} at {}: {}",
                key,
                staged.display(),
                e
            ))
        })?;

        let result = self.put_file(key, &staged, false).await;
        if result.is_err() {
            let _ = fs::remove_file(&staged).await;
        }
        result
    }

    async fn write_file(&self, key: &str, source: &Path, keep_source: bool) -> StorageResult<()> {
        self.put_file(key, source, keep_source).await
    }

    async fn remove(&self, key: &str) -> StorageResult<Removal> {
        let start = std::time::Instant::now();

        self.backend.delete(&self.bucket, key).await.inspect_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Remote delete failed"
            );
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote delete successful"
        );

        Ok(Removal::Deleted)
    }
}
