//! Upload validation

use crate::traits::{StorageError, StorageResult};

/// Non-image MIME types accepted from browser uploads. Any `image/*` type is
/// accepted.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/zip",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/pdf",
    "text/plain",
    "video/mp4",
    "video/quicktime",
    "application/octet-stream",
    "text/csv",
    "audio/mpeg",
];

pub fn check_upload_type(content_type: &str) -> StorageResult<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    let top_level = essence.split('/').next().unwrap_or("");
    if top_level == "image" || ALLOWED_CONTENT_TYPES.contains(&essence.as_str()) {
        return Ok(());
    }

    Err(StorageError::Validation(format!(
        "files of type '{}' are not allowed",
        content_type
    )))
}

pub fn check_size(size: u64, max_length: u64) -> StorageResult<()> {
    if size > max_length {
        return Err(StorageError::Validation(format!(
            "file is {} bytes, the limit is {} bytes",
            size, max_length
        )));
    }
    Ok(())
}
