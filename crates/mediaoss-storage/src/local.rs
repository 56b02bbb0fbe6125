use crate::placement::{Placement, Removal};
use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Mounted bucket: objects are plain files under `base_path`
#[derive(Clone)]
pub(crate) struct MountPlacement {
    base_path: PathBuf,
}

impl MountPlacement {
    pub(crate) fn new(base_path: impl Into<PathBuf>) -> Self {
        MountPlacement {
            base_path: base_path.into(),
        }
    }

    /// Convert a key to a filesystem path, rejecting keys that could escape
    /// the mount root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let confined = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !confined {
            return Err(StorageError::InvalidKey(format!(
                "{} resolves outside the storage directory",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Placement for MountPlacement {
    fn is_mount(&self) -> bool {
        true
    }

    async fn write_bytes(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Mount upload successful"
        );

        Ok(())
    }

    async fn write_file(&self, key: &str, source: &Path, keep_source: bool) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        if keep_source {
            fs::copy(source, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    path.display(),
                    e
                ))
            })?;
        } else if let Err(rename_err) = fs::rename(source, &path).await {
            // rename cannot cross filesystems, e.g. /tmp into a network mount
            tracing::debug!(error = %rename_err, "Rename failed, falling back to copy");
            fs::copy(source, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move {} to {}: {}",
                    source.display(),
                    path.display(),
                    e
                ))
            })?;
            fs::remove_file(source).await?;
        }

        tracing::info!(
            source = %source.display(),
            path = %path.display(),
            key = %key,
            kept_source = keep_source,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Mount file placement successful"
        );

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<Removal> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Removal::AlreadyAbsent);
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Mount delete successful"
        );

        Ok(Removal::Deleted)
    }
}
