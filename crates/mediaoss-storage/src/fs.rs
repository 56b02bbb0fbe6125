//! Directory helpers shared by the mount and remote placements.

use crate::traits::{StorageError, StorageResult};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Successful directory creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Existing,
    Created,
}

/// Why a directory could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirCreateFailure {
    PermissionDenied,
    /// Something that is not a directory already occupies the path
    AlreadyExists,
    Unknown(String),
}

impl Display for DirCreateFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DirCreateFailure::PermissionDenied => write!(f, "permission denied"),
            DirCreateFailure::AlreadyExists => write!(f, "path exists and is not a directory"),
            DirCreateFailure::Unknown(reason) => write!(f, "{}", reason),
        }
    }
}

/// Create `path` and its parents.
pub async fn create_dir(path: &Path) -> StorageResult<DirStatus> {
    if let Ok(meta) = fs::metadata(path).await {
        return if meta.is_dir() {
            Ok(DirStatus::Existing)
        } else {
            Err(creation_error(path, DirCreateFailure::AlreadyExists))
        };
    }

    match fs::create_dir_all(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Created storage directory");
            Ok(DirStatus::Created)
        }
        Err(e) => {
            // Lost a race with another creator
            if e.kind() == ErrorKind::AlreadyExists && is_dir(path).await {
                return Ok(DirStatus::Existing);
            }
            let kind = match e.kind() {
                ErrorKind::PermissionDenied => DirCreateFailure::PermissionDenied,
                ErrorKind::AlreadyExists => DirCreateFailure::AlreadyExists,
                _ => DirCreateFailure::Unknown(e.to_string()),
            };
            Err(creation_error(path, kind))
        }
    }
}

pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

fn creation_error(path: &Path, kind: DirCreateFailure) -> StorageError {
    tracing::error!(path = %path.display(), reason = %kind, "Failed to create storage directory");
    StorageError::DirectoryCreation {
        path: path.to_path_buf(),
        kind,
    }
}
