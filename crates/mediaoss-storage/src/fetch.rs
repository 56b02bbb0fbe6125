//! Remote file download used when re-hosting files by URL.

use crate::traits::{StorageError, StorageResult};
use crate::validation::check_size;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; MSIE 5.01; Windows NT 5.0)";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Body and headers of a fetched file
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub content: Bytes,
    pub content_type: String,
    pub http_status: u16,
}

/// Single-attempt HTTP(S) downloader
///
/// Certificate verification is disabled so self-signed sources can be
/// re-hosted. There are no retries and redirects are not followed; any
/// transport error or a status other than 200 fails the fetch.
#[derive(Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    pub fn new(proxy_url: Option<&str>, connect_timeout: Duration) -> StorageResult<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true);

        if let Some(proxy_url) = proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                StorageError::ConfigError(format!("Invalid HTTP proxy {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        } else {
            // Only the configured proxy is used, never the environment's
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(RemoteFetcher { client })
    }

    /// Download `url`, refusing bodies larger than `max_length` bytes.
    pub async fn fetch(&self, url: &str, max_length: u64) -> StorageResult<FetchedFile> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, url = %url, "Remote fetch transport error");
            StorageError::Fetch(format!("transport error: {}", e))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %url, status = status.as_u16(), "Remote fetch returned non-200 status");
            return Err(StorageError::Fetch(format!("http error {}", status.as_u16())));
        }

        if let Some(declared) = response.content_length() {
            check_size(declared, max_length)?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let content = response
            .bytes()
            .await
            .map_err(|e| StorageError::Fetch(format!("failed to read response body: {}", e)))?;
        check_size(content.len() as u64, max_length)?;

        tracing::info!(
            url = %url,
            content_type = %content_type,
            size_bytes = content.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote fetch successful"
        );

        Ok(FetchedFile {
            content,
            content_type,
            http_status: status.as_u16(),
        })
    }
}
