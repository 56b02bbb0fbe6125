//! AliYun OSS driver
//!
//! Upload policies are signed locally with HMAC-SHA1, so `get_sign` works
//! in both modes without a backend client. Temporary URLs are always issued
//! over https.

use crate::backend::{ObjectBackend, ObjectStat};
use crate::driver::{settle, DriverCore};
use crate::sign::PolicySigner;
use crate::traits::{ObjectInspector, StorageDriver, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use mediaoss_core::{Outcome, Provider, SignedPolicy, StorageConfig, UploadOutcome, UploadedFile};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct AliYunDriver {
    core: DriverCore,
}

impl AliYunDriver {
    /// Build a driver. `backend` is only consulted in remote mode.
    pub async fn new(
        config: StorageConfig,
        backend: Option<Arc<dyn ObjectBackend>>,
    ) -> StorageResult<Self> {
        let core = DriverCore::new(Provider::AliYun, config, backend).await?;
        Ok(AliYunDriver { core })
    }

    /// Host the provider itself serves the bucket from.
    fn canonical_host(&self) -> String {
        let config = self.core.config();
        let endpoint = config
            .endpoint
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        format!("https://{}.{}", config.bucket, endpoint)
    }
}

#[async_trait]
impl StorageDriver for AliYunDriver {
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
        let signed = PolicySigner::from_config(self.core.config())
            .sign(self.core.prefix(), Utc::now())
            .map(SignedPolicy::Post);
        settle("get_sign", signed, "request succeeded")
    }

    async fn get_url(&self, file: &str, expires_in: Duration) -> UploadOutcome {
        let canonical = self.canonical_host();
        self.core
            .get_url(file, expires_in, true, Some(canonical.as_str()))
            .await
    }

    fn inspector(&self) -> Option<&dyn ObjectInspector> {
        Some(self)
    }
}

#[async_trait]
impl ObjectInspector for AliYunDriver {
    async fn get_stat(&self, file: &str) -> Outcome<ObjectStat> {
        self.core.get_stat(file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(path: &Path) -> StorageConfig {
        StorageConfig {
            merchant_id: 3,
            bucket: "media".to_string(),
            endpoint: "https://oss-cn-hangzhou.aliyuncs.com/".to_string(),
            access_key_id: "id".to_string(),
            access_key_secret: "secret".to_string(),
            ..StorageConfig::mounted(path.to_string_lossy())
        }
    }

    #[tokio::test]
    async fn test_canonical_host() {
        let dir = tempdir().unwrap();
        let driver = AliYunDriver::new(config(dir.path()), None).await.unwrap();
        assert_eq!(
            driver.canonical_host(),
            "https://media.oss-cn-hangzhou.aliyuncs.com"
        );
    }

    #[tokio::test]
    async fn test_mount_driver_signs_without_backend() {
        let dir = tempdir().unwrap();
        let driver = AliYunDriver::new(config(dir.path()), None).await.unwrap();
        assert!(driver.is_mount());

        let outcome = driver.get_sign().await;
        assert!(outcome.is_success());
        let signed = outcome.data.unwrap();
        assert_eq!(signed.key_prefix(), driver.key_prefix());
        assert!(matches!(signed, SignedPolicy::Post(_)));
    }

    #[tokio::test]
    async fn test_only_inspector_is_offered() {
        let dir = tempdir().unwrap();
        let driver = AliYunDriver::new(config(dir.path()), None).await.unwrap();
        assert!(driver.inspector().is_some());
        assert!(driver.batch_remover().is_none());
        assert!(driver.video_merger().is_none());
    }

    #[tokio::test]
    async fn test_get_url_rejected_in_mount_mode() {
        let dir = tempdir().unwrap();
        let driver = AliYunDriver::new(config(dir.path()), None).await.unwrap();
        let outcome = driver
            .get_url("/image/3/a.png", Duration::from_secs(300))
            .await;
        assert!(!outcome.is_success());
    }
}
