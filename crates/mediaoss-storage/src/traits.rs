//! Storage driver abstraction
//!
//! This module defines the `StorageDriver` trait every provider implements,
//! the optional capability extensions, and the error type used inside the
//! drivers. Errors never cross the public driver operations: they are folded
//! into an [`Outcome`] at the operation boundary.

use crate::backend::ObjectStat;
use crate::fs::DirCreateFailure;
use async_trait::async_trait;
use mediaoss_core::{Outcome, Provider, SignedPolicy, UploadOutcome, UploadedFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to create directory {}: {kind}", path.display())]
    DirectoryCreation { path: PathBuf, kind: DirCreateFailure },

    #[error("{0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Message reported by the provider backend, kept verbatim.
    #[error("{0}")]
    Backend(String),

    /// Shown after the "upload failed: " outcome prefix.
    #[error("{0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Log level used when an error is folded into a failed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad input, disallowed type, foreign key
    Debug,
    /// Remote source problems
    Warn,
    /// Backend, filesystem and setup failures
    Error,
}

impl StorageError {
    pub fn log_level(&self) -> LogLevel {
        match self {
            StorageError::Validation(_)
            | StorageError::InvalidKey(_)
            | StorageError::Unsupported(_) => LogLevel::Debug,
            StorageError::Fetch(_) => LogLevel::Warn,
            StorageError::ConfigError(_)
            | StorageError::DirectoryCreation { .. }
            | StorageError::Backend(_)
            | StorageError::UploadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::IoError(_) => LogLevel::Error,
        }
    }

    /// Whether the error happens while building a driver rather than while
    /// serving an operation.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            StorageError::ConfigError(_) | StorageError::DirectoryCreation { .. }
        )
    }
}

/// Result of a bulk delete
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchDeletion {
    pub deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// Handle of a submitted video concatenation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeJob {
    pub task_id: String,
    /// Key the merged video will be written to
    pub key: String,
    pub url: String,
}

/// Unified storage driver
///
/// Both providers implement the common operation set. Every operation
/// returns an [`Outcome`]; callers branch on its status flag. Provider
/// specific operations are exposed through the capability accessors at the
/// bottom of the trait and must be checked for at call time.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    fn provider(&self) -> Provider;

    /// Effective mount mode, fixed at construction.
    fn is_mount(&self) -> bool;

    /// Time-partitioned key prefix shared by all uploads through this driver
    fn key_prefix(&self) -> &str;

    /// Download `url` and store it under the driver prefix.
    ///
    /// Without `name` the file name comes from the URL, with its extension
    /// corrected to the response MIME subtype.
    async fn upload_remote_file(&self, url: &str, name: Option<&str>) -> UploadOutcome;

    /// Store a local file. `keep_local` copies it, otherwise it is moved.
    async fn upload_local_file(
        &self,
        file_path: &Path,
        name: Option<&str>,
        keep_local: bool,
    ) -> UploadOutcome;

    /// Store a local file under `new_base_path` instead of the image prefix.
    /// The source file is always consumed.
    async fn upload_local_special_file(
        &self,
        file_path: &Path,
        new_base_path: &str,
        name: Option<&str>,
    ) -> UploadOutcome;

    /// Store a file received from a browser form
    async fn upload(&self, file: &UploadedFile, name: Option<&str>) -> UploadOutcome;

    /// Delete an object by key or by public URL.
    ///
    /// Deleting a missing object in mount mode succeeds.
    async fn del_file(&self, file: &str) -> Outcome<()>;

    /// Issue a direct-upload authorization bound to [`key_prefix`](Self::key_prefix).
    async fn get_sign(&self) -> Outcome<SignedPolicy>;

    /// Temporary signed download URL. Remote mode only.
    async fn get_url(&self, file: &str, expires_in: Duration) -> UploadOutcome;

    fn inspector(&self) -> Option<&dyn ObjectInspector> {
        None
    }

    fn batch_remover(&self) -> Option<&dyn BatchRemover> {
        None
    }

    fn video_merger(&self) -> Option<&dyn VideoMerger> {
        None
    }
}

/// Object metadata lookup
#[async_trait]
pub trait ObjectInspector: Send + Sync {
    async fn get_stat(&self, file: &str) -> Outcome<ObjectStat>;
}

/// Bulk delete
///
/// Every key must belong to the configured host before anything is deleted.
#[async_trait]
pub trait BatchRemover: Send + Sync {
    async fn batch_del_file(&self, files: &[String]) -> Outcome<BatchDeletion>;
}

/// Asynchronous server-side video concatenation
#[async_trait]
pub trait VideoMerger: Send + Sync {
    async fn merge_video(&self, files: &[String]) -> Outcome<MergeJob>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_verbatim() {
        let err = StorageError::Backend("no such file or directory".to_string());
        assert_eq!(err.to_string(), "no such file or directory");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_setup_errors() {
        assert!(StorageError::ConfigError("x".to_string()).is_setup_error());
        assert!(!StorageError::Validation("x".to_string()).is_setup_error());
        assert_eq!(
            StorageError::Validation("x".to_string()).log_level(),
            LogLevel::Debug
        );
    }
}
