//! QiNiu driver
//!
//! Upload authorizations are tokens minted by the backend client, so
//! `get_sign` needs a registered backend even in mount mode. QiNiu also
//! offers batch delete and server-side video concatenation.

use crate::backend::{ObjectBackend, ObjectStat};
use crate::driver::{settle, DriverCore};
use crate::sign::mint_upload_token;
use crate::traits::{
    BatchDeletion, BatchRemover, MergeJob, ObjectInspector, StorageDriver, StorageResult,
    VideoMerger,
};
use async_trait::async_trait;
use chrono::Utc;
use mediaoss_core::{Outcome, Provider, SignedPolicy, StorageConfig, UploadOutcome, UploadedFile};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct QiNiuDriver {
    core: DriverCore,
}

impl QiNiuDriver {
    pub async fn new(
        config: StorageConfig,
        backend: Option<Arc<dyn ObjectBackend>>,
    ) -> StorageResult<Self> {
        let core = DriverCore::new(Provider::QiNiu, config, backend).await?;
        Ok(QiNiuDriver { core })
    }

    async fn mint_token(&self) -> StorageResult<SignedPolicy> {
        let backend = self.core.backend()?;
        let config = self.core.config();
        let token = mint_upload_token(
            backend,
            &config.bucket,
            self.core.prefix(),
            Utc::now(),
            config.expire_time,
        )
        .await?;
        Ok(SignedPolicy::Token(token))
    }
}

#[async_trait]
impl StorageDriver for QiNiuDriver {
    fn provider(&self) -> Provider {
        self.core.provider()
    }

    fn is_mount(&self) -> bool {
        self.core.is_mount()
    }

    fn key_prefix(&self) -> &str {
        self.core.prefix()
    }

    async fn upload_remote_file(&self, url: &str, name: Option<&str>) -> UploadOutcome {
        self.core.upload_remote_file(url, name).await
    }

    async fn upload_local_file(
        &self,
        file_path: &Path,
        name: Option<&str>,
        keep_local: bool,
    ) -> UploadOutcome {
        self.core.upload_local_file(file_path, name, keep_local).await
    }

    async fn upload_local_special_file(
        &self,
        file_path: &Path,
        new_base_path: &str,
        name: Option<&str>,
    ) -> UploadOutcome {
        self.core
            .upload_local_special_file(file_path, new_base_path, name)
            .await
    }

    async fn upload(&self, file: &UploadedFile, name: Option<&str>) -> UploadOutcome {
        self.core.upload(file, name).await
    }

    async fn del_file(&self, file: &str) -> Outcome<()> {
        self.core.del_file(file).await
    }

    async fn get_sign(&self) -> Outcome<SignedPolicy> {
        settle("get_sign", self.mint_token().await, "request succeeded")
    }

    /// URLs are signed against the configured host as given.
    async fn get_url(&self, file: &str, expires_in: Duration) -> UploadOutcome {
        self.core.get_url(file, expires_in, false, None).await
    }

    fn inspector(&self) -> Option<&dyn ObjectInspector> {
        Some(self)
    }

    fn batch_remover(&self) -> Option<&dyn BatchRemover> {
        Some(self)
    }

    fn video_merger(&self) -> Option<&dyn VideoMerger> {
        Some(self)
    }
}

#[async_trait]
impl ObjectInspector for QiNiuDriver {
    async fn get_stat(&self, file: &str) -> Outcome<ObjectStat> {
        self.core.get_stat(file).await
    }
}

#[async_trait]
impl BatchRemover for QiNiuDriver {
    async fn batch_del_file(&self, files: &[String]) -> Outcome<BatchDeletion> {
        self.core.batch_del_file(files).await
    }
}

#[async_trait]
impl VideoMerger for QiNiuDriver {
    async fn merge_video(&self, files: &[String]) -> Outcome<MergeJob> {
        self.core.merge_video(files).await
    }
}
