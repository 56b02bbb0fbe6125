#[cfg(feature = "provider-aliyun")]
use crate::AliYunDriver;
#[cfg(feature = "provider-qiniu")]
use crate::QiNiuDriver;
use crate::{ObjectBackend, StorageDriver, StorageError, StorageResult};
use mediaoss_core::{Provider, StorageConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds provider drivers from configuration
///
/// Backend clients are registered per provider up front; a driver only
/// needs one when it ends up in remote mode (or, for QiNiu, to sign).
#[derive(Clone, Default)]
pub struct DriverFactory {
    backends: HashMap<Provider, Arc<dyn ObjectBackend>>,
}

impl DriverFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, provider: Provider, backend: Arc<dyn ObjectBackend>) -> Self {
        self.backends.insert(provider, backend);
        self
    }

    pub fn backend(&self, provider: Provider) -> Option<Arc<dyn ObjectBackend>> {
        self.backends.get(&provider).cloned()
    }

    /// Create a driver for the provider named `provider_name` (`aliYun` or `qiNiu`).
    pub async fn create(
        &self,
        config: StorageConfig,
        provider_name: &str,
    ) -> StorageResult<Arc<dyn StorageDriver>> {
        let provider = provider_name
            .parse::<Provider>()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        self.create_for(provider, config).await
    }

    /// Create a driver for the provider named in the configuration itself.
    pub async fn create_from_config(
        &self,
        config: StorageConfig,
    ) -> StorageResult<Arc<dyn StorageDriver>> {
        let provider = config.provider.ok_or_else(|| {
            StorageError::ConfigError("OSS_PROVIDER not configured".to_string())
        })?;
        self.create_for(provider, config).await
    }

    pub async fn create_for(
        &self,
        provider: Provider,
        config: StorageConfig,
    ) -> StorageResult<Arc<dyn StorageDriver>> {
        let backend = self.backend(provider);

        match provider {
            #[cfg(feature = "provider-aliyun")]
            Provider::AliYun => {
                let driver = AliYunDriver::new(config, backend).await?;
                Ok(Arc::new(driver))
            }

            #[cfg(not(feature = "provider-aliyun"))]
            Provider::AliYun => Err(StorageError::ConfigError(
                "AliYun driver not available (provider-aliyun feature not enabled)".to_string(),
            )),

            #[cfg(feature = "provider-qiniu")]
            Provider::QiNiu => {
                let driver = QiNiuDriver::new(config, backend).await?;
                Ok(Arc::new(driver))
            }

            #[cfg(not(feature = "provider-qiniu"))]
            Provider::QiNiu => Err(StorageError::ConfigError(
                "QiNiu driver not available (provider-qiniu feature not enabled)".to_string(),
            )),
        }
    }
}
