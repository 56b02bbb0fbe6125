//! Configuration module
//!
//! `StorageConfig` is the immutable record a driver is built from. It can be
//! deserialized from the historical option names (`path`, `isMount`,
//! `returnHost`, `merchant_id`, `endPoint`, ...) or loaded from `OSS_*`
//! environment variables.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage_types::Provider;

const EXPIRE_TIME_SECS: u64 = 3600;
const MAX_LENGTH_BYTES: u64 = 500 * 1024 * 1024;
const STAGING_DIR: &str = "/tmp/oss";
const CONNECT_TIMEOUT_SECS: u64 = 5;
const UNSET_PROXY_HOST: &str = "0.0.0.0";

/// Outbound HTTP proxy used when fetching remote files
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpProxy {
    pub host: String,
    pub port: u16,
}

impl HttpProxy {
    /// Proxy URL, or `None` when the host is the `0.0.0.0` placeholder.
    pub fn url(&self) -> Option<String> {
        let host = self.host.trim();
        if host.is_empty() || host == UNSET_PROXY_HOST {
            return None;
        }
        Some(format!("http://{}:{}", host, self.port))
    }
}

/// Per-driver storage configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: Option<Provider>,
    /// Mount root. Required by every driver, even in remote mode.
    #[serde(default, rename = "path")]
    pub base_path: Option<String>,
    #[serde(default = "default_true", rename = "isMount")]
    pub is_mount: bool,
    #[serde(default, rename = "returnHost")]
    pub return_host: bool,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default, rename = "accessKeyId")]
    pub access_key_id: String,
    #[serde(default, rename = "accessKeySecret")]
    pub access_key_secret: String,
    #[serde(default, rename = "endPoint")]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub merchant_id: u64,
    #[serde(default = "default_expire_time", rename = "expireTime")]
    pub expire_time: u64,
    #[serde(default = "default_max_length", rename = "maxLength")]
    pub max_length: u64,
    #[serde(default, rename = "httpProxy")]
    pub http_proxy: Option<HttpProxy>,
    #[serde(default = "default_staging_dir", rename = "stagingDir")]
    pub staging_dir: String,
    #[serde(default = "default_connect_timeout", rename = "connectTimeoutSecs")]
    pub connect_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_expire_time() -> u64 {
    EXPIRE_TIME_SECS
}

fn default_max_length() -> u64 {
    MAX_LENGTH_BYTES
}

fn default_staging_dir() -> String {
    STAGING_DIR.to_string()
}

fn default_connect_timeout() -> u64 {
    CONNECT_TIMEOUT_SECS
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            provider: None,
            base_path: None,
            is_mount: true,
            return_host: false,
            host: String::new(),
            bucket: String::new(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            endpoint: String::new(),
            region: String::new(),
            merchant_id: 0,
            expire_time: EXPIRE_TIME_SECS,
            max_length: MAX_LENGTH_BYTES,
            http_proxy: None,
            staging_dir: STAGING_DIR.to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
        }
    }
}

impl StorageConfig {
    /// Mount configuration rooted at `base_path`.
    pub fn mounted(base_path: impl Into<String>) -> Self {
        StorageConfig {
            base_path: Some(base_path.into()),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let provider = match env::var("OSS_PROVIDER") {
            Ok(name) => Some(name.parse::<Provider>()?),
            Err(_) => None,
        };

        let http_proxy = match (
            env::var("OSS_HTTP_PROXY_HOST").ok(),
            env::var("OSS_HTTP_PROXY_PORT").ok(),
        ) {
            (Some(host), Some(port)) => Some(HttpProxy {
                host,
                port: port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("OSS_HTTP_PROXY_PORT must be a valid port"))?,
            }),
            _ => None,
        };

        let config = StorageConfig {
            provider,
            base_path: env::var("OSS_PATH").ok(),
            is_mount: env::var("OSS_IS_MOUNT")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            return_host: env::var("OSS_RETURN_HOST")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            host: env::var("OSS_HOST").unwrap_or_default(),
            bucket: env::var("OSS_BUCKET").unwrap_or_default(),
            access_key_id: env::var("OSS_ACCESS_KEY_ID").unwrap_or_default(),
            access_key_secret: env::var("OSS_ACCESS_KEY_SECRET").unwrap_or_default(),
            endpoint: env::var("OSS_ENDPOINT").unwrap_or_default(),
            region: env::var("OSS_REGION").unwrap_or_default(),
            merchant_id: env::var("OSS_MERCHANT_ID")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("OSS_MERCHANT_ID must be a non-negative number"))?,
            expire_time: env::var("OSS_EXPIRE_TIME")
                .unwrap_or_else(|_| EXPIRE_TIME_SECS.to_string())
                .parse()
                .unwrap_or(EXPIRE_TIME_SECS),
            max_length: env::var("OSS_MAX_LENGTH")
                .unwrap_or_else(|_| MAX_LENGTH_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_LENGTH_BYTES),
            http_proxy,
            staging_dir: env::var("OSS_STAGING_DIR").unwrap_or_else(|_| STAGING_DIR.to_string()),
            connect_timeout_secs: env::var("OSS_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| CONNECT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECT_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.base_path.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(anyhow::anyhow!("OSS_PATH (mount root) must be set"));
            }
            _ => {}
        }
        if self.expire_time == 0 {
            return Err(anyhow::anyhow!("OSS_EXPIRE_TIME must be greater than zero"));
        }
        if self.max_length == 0 {
            return Err(anyhow::anyhow!("OSS_MAX_LENGTH must be greater than zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "OSS_CONNECT_TIMEOUT_SECS must be greater than zero"
            ));
        }
        Ok(())
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }

    /// Public host without its trailing slash.
    pub fn host(&self) -> &str {
        self.host.trim_end_matches('/')
    }

    pub fn proxy_url(&self) -> Option<String> {
        self.http_proxy.as_ref().and_then(HttpProxy::url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_original_option_names() {
        let raw = r#"{
            "path": "/data/bucket",
            "isMount": false,
            "returnHost": true,
            "merchant_id": 7,
            "accessKeyId": "id",
            "accessKeySecret": "secret",
            "endPoint": "oss-cn-hangzhou.aliyuncs.com",
            "region": "oss-cn-hangzhou",
            "bucket": "media",
            "host": "https://cdn.example.com/",
            "httpProxy": {"host": "10.0.0.1", "port": 3128}
        }"#;
        let config: StorageConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.base_path(), Some(Path::new("/data/bucket")));
        assert!(!config.is_mount);
        assert!(config.return_host);
        assert_eq!(config.merchant_id, 7);
        assert_eq!(config.endpoint, "oss-cn-hangzhou.aliyuncs.com");
        assert_eq!(config.host(), "https://cdn.example.com");
        assert_eq!(config.expire_time, 3600);
        assert_eq!(config.max_length, 500 * 1024 * 1024);
        assert_eq!(config.proxy_url().as_deref(), Some("http://10.0.0.1:3128"));
    }

    #[test]
    fn test_defaults() {
        let config: StorageConfig = serde_json::from_str(r#"{"path": "/srv"}"#).unwrap();
        assert!(config.is_mount);
        assert!(!config.return_host);
        assert_eq!(config.merchant_id, 0);
        assert_eq!(config.staging_dir, "/tmp/oss");
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_proxy_is_ignored() {
        let proxy = HttpProxy {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert!(proxy.url().is_none());
    }

    #[test]
    fn test_validate_requires_path() {
        let config = StorageConfig::default();
        assert!(config.validate().is_err());

        let config = StorageConfig::mounted("  ");
        assert!(config.validate().is_err());
    }
}
