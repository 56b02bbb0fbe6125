//! Direct-upload authorization
//!
//! The HMAC provider gets a POST policy signed locally with the account
//! secret; the token provider asks its backend for an upload token. Either
//! artifact only authorizes uploads under the driver's key prefix and only
//! until the absolute expiry. Signing never touches stored objects.

use crate::backend::ObjectBackend;
use crate::traits::{StorageError, StorageResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use mediaoss_core::{PostPolicy, StorageConfig, UploadToken};
use serde::Serialize;
use serde_json::{json, Value};
use sha1::Sha1;
use std::time::Duration;

type HmacSha1 = Hmac<Sha1>;

#[derive(Serialize)]
struct PolicyDocument {
    expiration: String,
    conditions: Vec<Value>,
}

/// ISO-8601 UTC with second precision and a `Z` suffix.
pub fn expiration_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn expiry(issued_at: &DateTime<Utc>, expire_secs: u64) -> StorageResult<DateTime<Utc>> {
    i64::try_from(expire_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| StorageError::ConfigError(format!("expire time {}s is out of range", expire_secs)))
}

/// Signs POST policies for browser uploads straight to the bucket
pub struct PolicySigner<'a> {
    access_key_id: &'a str,
    access_key_secret: &'a str,
    endpoint: &'a str,
    bucket: &'a str,
    region: &'a str,
    expire_secs: u64,
    max_length: u64,
}

impl<'a> PolicySigner<'a> {
    pub fn from_config(config: &'a StorageConfig) -> Self {
        PolicySigner {
            access_key_id: &config.access_key_id,
            access_key_secret: &config.access_key_secret,
            endpoint: &config.endpoint,
            bucket: &config.bucket,
            region: &config.region,
            expire_secs: config.expire_time,
            max_length: config.max_length,
        }
    }

    /// Base64 policy document restricting size and key prefix.
    pub fn encode_policy(&self, key_prefix: &str, expires_at: &DateTime<Utc>) -> StorageResult<String> {
        let document = PolicyDocument {
            expiration: expiration_timestamp(expires_at),
            conditions: vec![
                json!(["content-length-range", 0, self.max_length]),
                // `$key` is a literal field reference, not a placeholder
                json!(["starts-with", "$key", key_prefix]),
            ],
        };
        let encoded = serde_json::to_vec(&document)
            .map_err(|e| StorageError::ConfigError(format!("Failed to encode policy: {}", e)))?;
        Ok(BASE64.encode(encoded))
    }

    /// Base64 HMAC-SHA1 of `payload` under the account secret.
    pub fn signature(&self, payload: &str) -> StorageResult<String> {
        let mut mac = HmacSha1::new_from_slice(self.access_key_secret.as_bytes())
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    pub fn sign(&self, key_prefix: &str, issued_at: DateTime<Utc>) -> StorageResult<PostPolicy> {
        if self.access_key_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "accessKeySecret is required to sign upload policies".to_string(),
            ));
        }

        let expires_at = expiry(&issued_at, self.expire_secs)?;
        let policy = self.encode_policy(key_prefix, &expires_at)?;
        let signature = self.signature(&policy)?;

        tracing::debug!(
            bucket = %self.bucket,
            key_prefix = %key_prefix,
            expires_at = %expires_at,
            "Signed upload policy"
        );

        Ok(PostPolicy {
            access_key_id: self.access_key_id.to_string(),
            host: self.endpoint.to_string(),
            policy,
            signature,
            expire: expires_at.timestamp(),
            bucket: self.bucket.to_string(),
            key: key_prefix.to_string(),
            region: self.region.to_string(),
        })
    }
}

/// Ask the backend for a bucket-scoped upload token.
pub async fn mint_upload_token(
    backend: &dyn ObjectBackend,
    bucket: &str,
    key_prefix: &str,
    issued_at: DateTime<Utc>,
    expire_secs: u64,
) -> StorageResult<UploadToken> {
    let expires_at = expiry(&issued_at, expire_secs)?;
    let token = backend
        .mint_token(bucket, Duration::from_secs(expire_secs))
        .await?;

    Ok(UploadToken {
        signature: token,
        expire: expires_at.timestamp(),
        bucket: bucket.to_string(),
        key: key_prefix.to_string(),
    })
}
