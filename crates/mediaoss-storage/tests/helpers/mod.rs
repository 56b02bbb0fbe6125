//! Test helpers: an in-memory backend, a one-shot HTTP server and
//! configuration builders.
//!
//! Run from workspace root: `cargo test -p mediaoss-storage`.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use mediaoss_storage::{
    BatchEntry, ObjectBackend, ObjectStat, PutReceipt, StorageConfig, StorageError, StorageResult,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const HOST: &str = "https://cdn.example.com";
pub const BUCKET: &str = "media";
pub const ENDPOINT: &str = "oss-cn-hangzhou.aliyuncs.com";
pub const MISSING_OBJECT: &str = "no such file or directory";

#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub data: Bytes,
    pub mime_type: String,
}

/// Bucket kept in memory, keyed by object key
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<HashMap<String, StoredEntry>>,
    concat_jobs: Mutex<Vec<(Vec<String>, String)>>,
}

impl MemoryBackend {
    pub fn insert(&self, key: &str, data: &'static [u8], mime_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredEntry {
                data: Bytes::from_static(data),
                mime_type: mime_type.to_string(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<StoredEntry> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn concat_jobs(&self) -> Vec<(Vec<String>, String)> {
        self.concat_jobs.lock().unwrap().clone()
    }
}

fn mime_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpeg" || ext == "jpg" => "image/jpeg",
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn put(&self, _bucket: &str, key: &str, data: Bytes) -> StorageResult<PutReceipt> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredEntry {
                data,
                mime_type: mime_for(key).to_string(),
            },
        );
        Ok(PutReceipt {
            key: key.to_string(),
            hash: None,
        })
    }

    async fn delete(&self, _bucket: &str, key: &str) -> StorageResult<()> {
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::Backend(MISSING_OBJECT.to_string())),
        }
    }

    async fn stat(&self, _bucket: &str, key: &str) -> StorageResult<ObjectStat> {
        let objects = self.objects.lock().unwrap();
        let entry = objects
            .get(key)
            .ok_or_else(|| StorageError::Backend(MISSING_OBJECT.to_string()))?;
        Ok(ObjectStat {
            size: entry.data.len() as u64,
            mime_type: entry.mime_type.clone(),
            hash: None,
            put_time: None,
        })
    }

    async fn sign_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "https://{}.{}/{}?Expires={}&Signature=test",
            bucket,
            ENDPOINT,
            key,
            expires_in.as_secs()
        ))
    }

    async fn mint_token(&self, bucket: &str, expires_in: Duration) -> StorageResult<String> {
        Ok(format!("token:{}:{}", bucket, expires_in.as_secs()))
    }

    async fn batch_delete(&self, _bucket: &str, keys: &[String]) -> StorageResult<Vec<BatchEntry>> {
        let mut objects = self.objects.lock().unwrap();
        Ok(keys
            .iter()
            .map(|key| BatchEntry {
                key: key.clone(),
                error: objects
                    .remove(key)
                    .is_none()
                    .then(|| MISSING_OBJECT.to_string()),
            })
            .collect())
    }

    async fn concat_videos(
        &self,
        _bucket: &str,
        sources: &[String],
        output_key: &str,
    ) -> StorageResult<String> {
        let mut jobs = self.concat_jobs.lock().unwrap();
        jobs.push((sources.to_vec(), output_key.to_string()));
        Ok(format!("task-{}", jobs.len()))
    }
}

/// Temporary mount root plus a scratch area for source files
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub base_path: PathBuf,
    pub scratch: PathBuf,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let base_path = temp_dir.path().join("bucket");
        let scratch = temp_dir.path().join("scratch");
        std::fs::create_dir_all(&base_path).expect("Failed to create mount root");
        std::fs::create_dir_all(&scratch).expect("Failed to create scratch directory");
        Self {
            temp_dir,
            base_path,
            scratch,
        }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir.path().join("staging")
    }

    pub fn mount_config(&self, merchant_id: u64) -> StorageConfig {
        StorageConfig {
            merchant_id,
            host: HOST.to_string(),
            access_key_id: "LTAI-test".to_string(),
            access_key_secret: "secret".to_string(),
            bucket: BUCKET.to_string(),
            endpoint: ENDPOINT.to_string(),
            region: "oss-cn-hangzhou".to_string(),
            ..StorageConfig::mounted(self.base_path.to_string_lossy())
        }
    }

    pub fn remote_config(&self, merchant_id: u64) -> StorageConfig {
        StorageConfig {
            is_mount: false,
            staging_dir: self.staging_dir().to_string_lossy().into_owned(),
            ..self.mount_config(merchant_id)
        }
    }

    /// Write a source file into the scratch area.
    pub fn source_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.scratch.join(name);
        std::fs::write(&path, contents).expect("Failed to write source file");
        path
    }

    pub fn mounted(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Serve one canned HTTP response and return the base URL.
pub async fn serve_once(content_type: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read test server address");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Failed to accept connection");
        let mut buf = [0u8; 2048];
        let _ = socket.read(&mut buf).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            content_type,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.expect("Failed to write head");
        socket.write_all(body).await.expect("Failed to write body");
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}
