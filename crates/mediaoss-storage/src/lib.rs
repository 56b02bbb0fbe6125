//! Mediaoss Storage Library
//!
//! Unified drivers over AliYun OSS and QiNiu storage. A driver either writes
//! straight into a locally mounted bucket directory (mount mode) or stages
//! files and hands them to a provider backend client (remote mode). The mode
//! is decided once, when the driver is built.
//!
//! # Object key format
//!
//! - **Regular uploads**: `image/{merchant_id}/{YYYYMMDD}/{HHMMSS}/{filename}`,
//!   with the time partition fixed for the lifetime of the driver.
//! - **Special uploads**: `{base}/{YYYYMMDD}/{HHMMSS}/{merchant_id}/{rand6}/{filename}`,
//!   computed per call.
//!
//! Key generation lives in the `keys` module so both providers stay consistent.

#[cfg(feature = "provider-aliyun")]
pub mod aliyun;
pub mod backend;
pub(crate) mod driver;
pub mod factory;
pub mod fetch;
pub mod fs;
pub mod keys;
pub(crate) mod local;
pub(crate) mod placement;
#[cfg(feature = "provider-qiniu")]
pub mod qiniu;
pub mod registry;
pub(crate) mod remote;
pub mod sign;
pub mod traits;
pub mod validation;

// Re-export commonly used types
#[cfg(feature = "provider-aliyun")]
pub use aliyun::AliYunDriver;
pub use backend::{BatchEntry, ObjectBackend, ObjectStat, PutReceipt};
pub use factory::DriverFactory;
pub use fetch::{FetchedFile, RemoteFetcher};
pub use mediaoss_core::{
    Outcome, Provider, SignedPolicy, StorageConfig, StoredObject, TransferError, UploadOutcome,
    UploadedFile,
};
#[cfg(feature = "provider-qiniu")]
pub use qiniu::QiNiuDriver;
pub use registry::DriverRegistry;
pub use traits::{
    BatchDeletion, BatchRemover, LogLevel, MergeJob, ObjectInspector, StorageDriver,
    StorageError, StorageResult, VideoMerger,
};
