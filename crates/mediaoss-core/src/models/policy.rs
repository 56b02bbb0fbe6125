use serde::Serialize;

/// Browser direct-upload authorization.
///
/// The HMAC provider returns a signed POST policy; the token provider returns
/// an opaque upload token labelled `signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SignedPolicy {
    Post(PostPolicy),
    Token(UploadToken),
}

impl SignedPolicy {
    /// Key prefix the policy is restricted to.
    pub fn key_prefix(&self) -> &str {
        match self {
            SignedPolicy::Post(p) => &p.key,
            SignedPolicy::Token(t) => &t.key,
        }
    }

    /// Absolute expiry as a unix timestamp.
    pub fn expire_at(&self) -> i64 {
        match self {
            SignedPolicy::Post(p) => p.expire,
            SignedPolicy::Token(t) => t.expire,
        }
    }

    pub fn signature(&self) -> &str {
        match self {
            SignedPolicy::Post(p) => &p.signature,
            SignedPolicy::Token(t) => &t.signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPolicy {
    #[serde(rename = "OSSAccessKeyId")]
    pub access_key_id: String,
    pub host: String,
    /// Base64 policy document
    pub policy: String,
    /// Base64 HMAC-SHA1 of `policy`
    pub signature: String,
    pub expire: i64,
    pub bucket: String,
    pub key: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadToken {
    pub signature: String,
    pub expire: i64,
    pub bucket: String,
    pub key: String,
}
