//! Mount-vs-remote I/O strategy.
//!
//! A driver picks one placement when it is built and every operation body
//! goes through it, so the business logic exists once and only the I/O
//! primitive differs between modes.

use crate::traits::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

/// Outcome of a delete that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    Deleted,
    AlreadyAbsent,
}

#[async_trait]
pub(crate) trait Placement: Send + Sync {
    fn is_mount(&self) -> bool;

    async fn write_bytes(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Store the file at `source` under `key`; `source` is removed afterwards
    /// unless `keep_source` is set.
    async fn write_file(&self, key: &str, source: &Path, keep_source: bool) -> StorageResult<()>;

    async fn remove(&self, key: &str) -> StorageResult<Removal>;
}
