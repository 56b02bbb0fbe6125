//! Operation bodies shared by both provider drivers.
//!
//! The mount decision is made once in [`DriverCore::new`] and captured as a
//! [`Placement`]; every operation below is written once against it.

use crate::backend::{ObjectBackend, ObjectStat};
use crate::fetch::RemoteFetcher;
use crate::fs::{create_dir, is_dir};
use crate::keys;
use crate::local::MountPlacement;
use crate::placement::{Placement, Removal};
use crate::remote::RemotePlacement;
use crate::traits::{BatchDeletion, LogLevel, MergeJob, StorageError, StorageResult};
use crate::validation::{check_size, check_upload_type};
use chrono::Local;
use mediaoss_core::{
    Outcome, Provider, StorageConfig, StoredObject, TransferError, UploadOutcome, UploadedFile,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

const UPLOAD_SUCCEEDED: &str = "upload succeeded";
const FILE_DELETED: &str = "file deleted";
const ALREADY_ABSENT: &str = "file does not exist, no deletion needed";

pub(crate) struct DriverCore {
    config: Arc<StorageConfig>,
    provider: Provider,
    placement: Box<dyn Placement>,
    backend: Option<Arc<dyn ObjectBackend>>,
    fetcher: RemoteFetcher,
    prefix: String,
}

impl DriverCore {
    pub(crate) async fn new(
        provider: Provider,
        config: StorageConfig,
        backend: Option<Arc<dyn ObjectBackend>>,
    ) -> StorageResult<Self> {
        let base_path = config
            .base_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| StorageError::ConfigError("oss path is not configured".to_string()))?;

        let mount = config.is_mount && is_dir(&base_path).await;
        if config.is_mount && !mount {
            tracing::warn!(
                provider = %provider,
                path = %base_path.display(),
                "Mount path is not a directory, falling back to remote mode"
            );
        }

        let fetcher = RemoteFetcher::new(
            config.proxy_url().as_deref(),
            Duration::from_secs(config.connect_timeout_secs),
        )?;
        let prefix = keys::build_prefix(config.merchant_id, &Local::now());

        let placement: Box<dyn Placement> = if mount {
            create_dir(&base_path.join(&prefix)).await?;
            Box::new(MountPlacement::new(base_path))
        } else {
            let client = backend.clone().ok_or_else(|| {
                StorageError::ConfigError(format!(
                    "remote mode requires a registered {} backend client",
                    provider
                ))
            })?;
            if config.bucket.trim().is_empty() {
                return Err(StorageError::ConfigError(
                    "bucket must be set in remote mode".to_string(),
                ));
            }
            let staging_dir = PathBuf::from(&config.staging_dir);
            create_dir(&staging_dir).await?;
            Box::new(RemotePlacement::new(client, config.bucket.clone(), staging_dir))
        };

        tracing::info!(
            provider = %provider,
            mount = mount,
            prefix = %prefix,
            merchant_id = config.merchant_id,
            "Storage driver initialized"
        );

        Ok(DriverCore {
            config: Arc::new(config),
            provider,
            placement,
            backend,
            fetcher,
            prefix,
        })
    }

    pub(crate) fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub(crate) fn provider(&self) -> Provider {
        self.provider
    }

    pub(crate) fn is_mount(&self) -> bool {
        self.placement.is_mount()
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn backend(&self) -> StorageResult<&dyn ObjectBackend> {
        self.backend.as_deref().ok_or_else(|| {
            StorageError::ConfigError(format!("no {} backend client is registered", self.provider))
        })
    }

    fn remote_backend(&self, operation: &str) -> StorageResult<&dyn ObjectBackend> {
        if self.is_mount() {
            return Err(StorageError::Unsupported(format!(
                "{} is only available in remote mode",
                operation
            )));
        }
        self.backend()
    }

    fn stored(&self, key: String) -> StoredObject {
        StoredObject {
            url: keys::public_url(&key, self.config.host(), self.config.return_host),
            key,
        }
    }

    fn key_under(prefix: &str, name: &str) -> StorageResult<String> {
        let name = keys::sanitize(name);
        if name.is_empty() {
            return Err(StorageError::Validation(
                "file name is empty after removing unsafe characters".to_string(),
            ));
        }
        Ok(format!("{}{}", prefix, name))
    }

    fn resolve(&self, file: &str) -> StorageResult<String> {
        keys::resolve_key(file, self.config.host()).ok_or_else(|| {
            StorageError::InvalidKey(format!("{} does not belong to this storage", file))
        })
    }

    pub(crate) async fn upload_remote_file(&self, url: &str, name: Option<&str>) -> UploadOutcome {
        let result: StorageResult<StoredObject> = async {
            let fetched = self.fetcher.fetch(url, self.config.max_length).await?;
            let name = match non_empty(name) {
                Some(name) => name.to_string(),
                None => keys::remote_file_name(url, &fetched.content_type),
            };
            let key = Self::key_under(&self.prefix, &name)?;
            self.placement.write_bytes(&key, fetched.content).await?;
            Ok(self.stored(key))
        }
        .await;
        upload_outcome("upload_remote_file", result)
    }

    pub(crate) async fn upload_local_file(
        &self,
        file_path: &Path,
        name: Option<&str>,
        keep_local: bool,
    ) -> UploadOutcome {
        let result: StorageResult<StoredObject> = async {
            let name = source_name(file_path, name).await?;
            let key = Self::key_under(&self.prefix, &name)?;
            self.placement.write_file(&key, file_path, keep_local).await?;
            Ok(self.stored(key))
        }
        .await;
        upload_outcome("upload_local_file", result)
    }

    pub(crate) async fn upload_local_special_file(
        &self,
        file_path: &Path,
        new_base_path: &str,
        name: Option<&str>,
    ) -> UploadOutcome {
        let result: StorageResult<StoredObject> = async {
            let name = source_name(file_path, name).await?;
            let prefix = keys::special_prefix(
                new_base_path,
                self.config.merchant_id,
                &Local::now(),
                keys::random_suffix(),
            );
            let key = Self::key_under(&prefix, &name)?;
            self.placement.write_file(&key, file_path, false).await?;
            Ok(self.stored(key))
        }
        .await;
        upload_outcome("upload_local_special_file", result)
    }

    pub(crate) async fn upload(&self, file: &UploadedFile, name: Option<&str>) -> UploadOutcome {
        let result: StorageResult<StoredObject> = async {
            if file.error != TransferError::Ok {
                return Err(StorageError::Validation(file.error.message().to_string()));
            }
            check_upload_type(&file.content_type)?;
            check_size(file.size, self.config.max_length)?;
            if !fs::try_exists(&file.temp_path).await.unwrap_or(false) {
                return Err(StorageError::Validation(
                    TransferError::NoFile.message().to_string(),
                ));
            }
            let name = non_empty(name).unwrap_or(file.name.as_str());
            let key = Self::key_under(&self.prefix, name)?;
            self.placement.write_file(&key, &file.temp_path, false).await?;
            Ok(self.stored(key))
        }
        .await;
        upload_outcome("upload", result)
    }

    pub(crate) async fn del_file(&self, file: &str) -> Outcome<()> {
        let result: StorageResult<Removal> = async {
            let key = self.resolve(file)?;
            self.placement.remove(&key).await
        }
        .await;

        match result {
            Ok(Removal::Deleted) => Outcome::done(FILE_DELETED),
            Ok(Removal::AlreadyAbsent) => Outcome::done(ALREADY_ABSENT),
            Err(e) => {
                log_failure("del_file", &e);
                Outcome::failed(e.to_string())
            }
        }
    }

    /// Signed download URL.
    ///
    /// `secure` forces https on both the input and the configured host.
    /// `canonical_host` is the provider's own bucket host, swapped for the
    /// configured host in the signed result.
    pub(crate) async fn get_url(
        &self,
        file: &str,
        expires_in: Duration,
        secure: bool,
        canonical_host: Option<&str>,
    ) -> UploadOutcome {
        let result: StorageResult<StoredObject> = async {
            let backend = self.remote_backend("get_url")?;
            let host = if secure {
                force_https(self.config.host())
            } else {
                self.config.host().to_string()
            };
            let file = if secure { force_https(file) } else { file.to_string() };

            let key = keys::resolve_key(&file, &host).ok_or_else(|| {
                StorageError::InvalidKey(format!("{} does not belong to {}", file, host))
            })?;
            let mut url = backend.sign_url(&self.config.bucket, &key, expires_in).await?;

            if let Some(canonical) = canonical_host {
                let canonical = canonical.trim_end_matches('/');
                if !host.is_empty() && canonical != host {
                    if let Some(rest) = url.strip_prefix(canonical) {
                        url = format!("{}{}", host, rest);
                    }
                }
            }
            Ok(StoredObject { url, key })
        }
        .await;
        settle("get_url", result, "")
    }

    pub(crate) async fn get_stat(&self, file: &str) -> Outcome<ObjectStat> {
        let result: StorageResult<ObjectStat> = async {
            let backend = self.remote_backend("get_stat")?;
            let key = self.resolve(file)?;
            backend.stat(&self.config.bucket, &key).await
        }
        .await;
        settle("get_stat", result, "")
    }

    pub(crate) async fn batch_del_file(&self, files: &[String]) -> Outcome<BatchDeletion> {
        let result: StorageResult<BatchDeletion> = async {
            let backend = self.remote_backend("batch_del_file")?;
            if files.is_empty() {
                return Err(StorageError::Validation("no files to delete".to_string()));
            }

            let resolved: Vec<Option<String>> = files
                .iter()
                .map(|file| keys::resolve_key(file, self.config.host()))
                .collect();
            let foreign = resolved.iter().filter(|key| key.is_none()).count();
            if foreign > 0 {
                return Err(StorageError::InvalidKey(format!(
                    "{} of {} files do not belong to this storage, nothing was deleted",
                    foreign,
                    files.len()
                )));
            }
            let keys: Vec<String> = resolved.into_iter().flatten().collect();

            let entries = backend.batch_delete(&self.config.bucket, &keys).await?;
            let (deleted, failed): (Vec<_>, Vec<_>) =
                entries.into_iter().partition(|entry| entry.is_ok());
            Ok(BatchDeletion {
                deleted: deleted.into_iter().map(|entry| entry.key).collect(),
                failed: failed.into_iter().map(|entry| entry.key).collect(),
            })
        }
        .await;

        match result {
            Ok(deletion) if deletion.failed.is_empty() => Outcome::ok(FILE_DELETED, deletion),
            Ok(deletion) => {
                tracing::warn!(
                    deleted = deletion.deleted.len(),
                    failed = deletion.failed.len(),
                    "Batch delete partially failed"
                );
                let message = format!(
                    "{} of {} files could not be deleted",
                    deletion.failed.len(),
                    deletion.failed.len() + deletion.deleted.len()
                );
                Outcome::failed_with(message, deletion)
            }
            Err(e) => {
                log_failure("batch_del_file", &e);
                Outcome::failed(e.to_string())
            }
        }
    }

    pub(crate) async fn merge_video(&self, files: &[String]) -> Outcome<MergeJob> {
        let result: StorageResult<MergeJob> = async {
            let backend = self.remote_backend("merge_video")?;
            if files.len() < 2 {
                return Err(StorageError::Validation(
                    "at least two videos are required to merge".to_string(),
                ));
            }

            let mut sources = Vec::with_capacity(files.len());
            for file in files {
                let key = self.resolve(file)?;
                let stat = backend.stat(&self.config.bucket, &key).await?;
                if !stat.mime_type.to_ascii_lowercase().starts_with("video/") {
                    return Err(StorageError::Validation(format!(
                        "{} is not a video ({})",
                        file, stat.mime_type
                    )));
                }
                sources.push(key);
            }

            let output_key = format!("{}{}.mp4", self.prefix, Uuid::new_v4().simple());
            let task_id = backend
                .concat_videos(&self.config.bucket, &sources, &output_key)
                .await?;

            tracing::info!(
                task_id = %task_id,
                sources = sources.len(),
                key = %output_key,
                "Video merge submitted"
            );

            Ok(MergeJob {
                task_id,
                url: keys::public_url(&output_key, self.config.host(), self.config.return_host),
                key: output_key,
            })
        }
        .await;
        settle("merge_video", result, "merge submitted")
    }
}

fn non_empty(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|name| !name.is_empty())
}

/// Name to store a local file under; the file must exist.
async fn source_name(file_path: &Path, name: Option<&str>) -> StorageResult<String> {
    let is_file = fs::metadata(file_path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(StorageError::Validation(format!(
            "file to upload not found: {}",
            file_path.display()
        )));
    }

    match non_empty(name) {
        Some(name) => Ok(name.to_string()),
        None => file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                StorageError::Validation(format!("{} has no file name", file_path.display()))
            }),
    }
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

pub(crate) fn log_failure(operation: &str, err: &StorageError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(operation = %operation, error = %err, "Storage operation rejected"),
        LogLevel::Warn => tracing::warn!(operation = %operation, error = %err, "Storage operation failed"),
        LogLevel::Error => tracing::error!(operation = %operation, error = %err, "Storage operation failed"),
    }
}

/// Fold a result into an outcome, keeping the error text as the message.
pub(crate) fn settle<T>(operation: &str, result: StorageResult<T>, message: &str) -> Outcome<T> {
    match result {
        Ok(data) => Outcome::ok(message, data),
        Err(e) => {
            log_failure(operation, &e);
            Outcome::failed(e.to_string())
        }
    }
}

fn upload_outcome(operation: &str, result: StorageResult<StoredObject>) -> UploadOutcome {
    match result {
        Ok(stored) => Outcome::ok(UPLOAD_SUCCEEDED, stored),
        Err(e) => {
            log_failure(operation, &e);
            Outcome::failed(format!("upload failed: {}", e))
        }
    }
}
