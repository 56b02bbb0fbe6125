//! Mediaoss Core Library
//!
//! This crate provides the configuration record, provider identifiers and the
//! result models shared by the storage drivers and their front ends.

pub mod config;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{HttpProxy, StorageConfig};
pub use models::{
    Outcome, PostPolicy, SignedPolicy, StoredObject, TransferError, UploadOutcome,
    UploadToken, UploadedFile,
};
pub use storage_types::Provider;
