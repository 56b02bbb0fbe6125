//! Process-level driver cache.
//!
//! Callers that build a driver per request with the same settings get the
//! same instance back. Only the most recent driver is kept; a different
//! provider or configuration replaces it.

use crate::factory::DriverFactory;
use crate::traits::{StorageDriver, StorageError, StorageResult};
use mediaoss_core::{Provider, StorageConfig};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;

struct CachedDriver {
    fingerprint: String,
    driver: Arc<dyn StorageDriver>,
}

pub struct DriverRegistry {
    factory: DriverFactory,
    current: Mutex<Option<CachedDriver>>,
}

impl DriverRegistry {
    pub fn new(factory: DriverFactory) -> Self {
        DriverRegistry {
            factory,
            current: Mutex::new(None),
        }
    }

    /// Return the cached driver when `provider_name` and `config` are
    /// unchanged, otherwise build and cache a new one.
    pub async fn init(
        &self,
        config: StorageConfig,
        provider_name: &str,
    ) -> StorageResult<Arc<dyn StorageDriver>> {
        let provider = provider_name
            .parse::<Provider>()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        let fingerprint = fingerprint(provider, &config)?;

        let mut current = self.current.lock().await;
        if let Some(cached) = current.as_ref() {
            if cached.fingerprint == fingerprint {
                tracing::debug!(provider = %provider, "Reusing cached storage driver");
                return Ok(Arc::clone(&cached.driver));
            }
        }

        // A failed build leaves the previous driver in place
        let driver = self.factory.create_for(provider, config).await?;
        *current = Some(CachedDriver {
            fingerprint,
            driver: Arc::clone(&driver),
        });
        Ok(driver)
    }
}

fn fingerprint(provider: Provider, config: &StorageConfig) -> StorageResult<String> {
    let encoded = serde_json::to_vec(config)
        .map_err(|e| StorageError::ConfigError(format!("Failed to encode configuration: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(provider.to_string().as_bytes());
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}
