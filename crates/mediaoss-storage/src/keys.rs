//! Object key generation.
//!
//! Regular key format: `image/{merchant_id}/{YYYYMMDD}/{HHMMSS}/{filename}`.
//! Special key format: `{base}/{YYYYMMDD}/{HHMMSS}/{merchant_id}/{rand6}/{filename}`.
//! All file names pass through [`sanitize`] before they become part of a key.

use chrono::{DateTime, TimeZone};
use rand::Rng;
use std::fmt::Display;
use uuid::Uuid;

/// Sequences stripped from file names. Percent-encoded forms are listed in
/// both cases.
const BLACKLIST: [&str; 15] = [
    "\0", "%00", "\r", "\t", "&", " ", "\"", "'", "<", ">", "%3C", "%3E", "%3c", "%3e", "\u{7f}",
];

/// Time-partitioned prefix for a merchant.
pub fn build_prefix<Tz>(merchant_id: u64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "image/{}/{}/{}/",
        merchant_id,
        now.format("%Y%m%d"),
        now.format("%H%M%S")
    )
}

/// Prefix for out-of-band uploads under a caller supplied base.
pub fn special_prefix<Tz>(base: &str, merchant_id: u64, now: &DateTime<Tz>, suffix: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let base = base.trim().trim_matches('/');
    let partition = format!("{}/{}/{}/", now.format("%Y%m%d/%H%M%S"), merchant_id, suffix);
    if base.is_empty() {
        partition
    } else {
        format!("{}/{}", base, partition)
    }
}

/// Six digit random directory name for special uploads.
pub fn random_suffix() -> u32 {
    rand::rng().random_range(100_000..=999_999)
}

/// Strip unsafe characters from a file name.
///
/// Removal runs until nothing changes, so pieces that only join into a
/// blacklisted sequence after an inner removal (`%0&0`) are caught too and
/// `sanitize(sanitize(s)) == sanitize(s)` holds.
pub fn sanitize(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let mut next = current.clone();
        for bad in BLACKLIST {
            if next.contains(bad) {
                next = next.replace(bad, "");
            }
        }
        next.retain(|c| !matches!(c, '\u{0}'..='\u{1f}'));
        if next == current {
            return next;
        }
        current = next;
    }
}

/// File name for a file fetched from `url`.
///
/// Uses the last path segment, or a random 32 character hex id when the URL
/// has none, and makes the extension match the MIME subtype of `content_type`.
pub fn remote_file_name(url: &str, content_type: &str) -> String {
    let segment = last_path_segment(url);
    let name = if segment.is_empty() {
        Uuid::new_v4().simple().to_string()
    } else {
        segment
    };

    let Some(subtype) = mime_subtype(content_type) else {
        return name;
    };

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name.as_str(), None),
    };

    match extension {
        Some(ext) if ext.eq_ignore_ascii_case(subtype) => name.clone(),
        _ => format!("{}.{}", stem, subtype),
    }
}

fn last_path_segment(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or("")
            .to_string(),
    }
}

fn mime_subtype(content_type: &str) -> Option<&str> {
    let essence = content_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    let subtype = subtype.trim();
    (!subtype.is_empty()).then_some(subtype)
}

/// Recover the bare key from a stored object reference.
///
/// Relative references are keys already. Absolute URLs must live under
/// `host`; anything else is foreign and yields `None`.
pub fn resolve_key(file: &str, host: &str) -> Option<String> {
    let file = file.trim();
    if !file.starts_with("http") {
        let key = file.trim_start_matches('/');
        return (!key.is_empty()).then(|| key.to_string());
    }

    let host = host.trim_end_matches('/');
    if host.is_empty() {
        return None;
    }
    let rest = file.strip_prefix(host)?;
    if !rest.starts_with('/') {
        return None;
    }
    let key = rest.trim_start_matches('/');
    (!key.is_empty()).then(|| key.to_string())
}

/// Public URL of `key`: `/{key}`, or `{host}/{key}` when the full host is requested.
pub fn public_url(key: &str, host: &str, return_host: bool) -> String {
    let path = format!("/{}", key.trim_start_matches('/'));
    if return_host {
        format!("{}{}", host.trim_end_matches('/'), path)
    } else {
        path
    }
}

/// Longest extension carried over into a staging name.
const STAGING_EXT_MAX: usize = 16;

/// Unique scratch file name for staging `key` before a remote put: a uuid
/// plus the key's extension, so the name stays short whatever the key length.
pub fn staging_name(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= STAGING_EXT_MAX && ext.is_ascii());
    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
        None => Uuid::new_v4().simple().to_string(),
    }
}
