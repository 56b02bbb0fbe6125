//! Provider backend contract
//!
//! The drivers do not speak any provider wire protocol themselves. In remote
//! mode they delegate to an [`ObjectBackend`], typically a thin adapter over
//! the provider SDK, registered with the
//! [`DriverFactory`](crate::factory::DriverFactory).

use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;

/// Acknowledgement of a successful put
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Key the backend stored the object under. Empty means the put did not land.
    pub key: String,
    pub hash: Option<String>,
}

/// Object metadata as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectStat {
    pub size: u64,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Unix timestamp of the upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put_time: Option<i64>,
}

/// Per-key result of a batch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub key: String,
    /// `None` on success
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Primitive operations a provider SDK exposes
///
/// Implementations report failures as [`StorageError::Backend`] carrying the
/// provider's own message.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> StorageResult<PutReceipt>;

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    async fn stat(&self, bucket: &str, key: &str) -> StorageResult<ObjectStat>;

    /// Signed private download URL for `key`, valid for `expires_in`
    async fn sign_url(&self, bucket: &str, key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Bucket-scoped upload token valid for `expires_in`
    async fn mint_token(&self, bucket: &str, expires_in: Duration) -> StorageResult<String>;

    async fn batch_delete(&self, bucket: &str, keys: &[String]) -> StorageResult<Vec<BatchEntry>>;

    /// Submit a server-side concatenation of `sources` into `output_key`,
    /// returning the provider task id.
    async fn concat_videos(
        &self,
        _bucket: &str,
        _sources: &[String],
        _output_key: &str,
    ) -> StorageResult<String> {
        Err(StorageError::Unsupported(
            "video concatenation is not supported by this backend".to_string(),
        ))
    }
}
