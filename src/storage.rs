//! Snapshot file IO and resource addressing. The producer writes two JSON
//! files into the snapshot dir; the engine reads them back through a
//! `ResourceLoader` keyed by relative URLs with cache-busting queries.

use crate::cache::{LoadError, ResourceLoader};
use crate::errors::AppError;
use crate::models::DailySnapshot;
use async_trait::async_trait;
use serde::Serialize;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;

pub const DAILY_FILE: &str = "daily.json";
pub const WEEKLY_FILE: &str = "weekly.json";

pub fn resolve_snapshot_dir() -> PathBuf {
    if let Ok(dir) = env::var("SNAPSHOT_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("data")
}

/// Daily snapshot URL with a per-load token, so a returning client never
/// reuses a stale daily entry from the session cache.
pub fn daily_url() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{DAILY_FILE}?t={millis}")
}

/// Weekly snapshot URL versioned by the daily snapshot's `updated_at`
/// (falling back to its date). A new producer run changes the token and
/// thereby the cache key, invalidating whatever a returning client holds.
pub fn weekly_url(daily: &DailySnapshot) -> String {
    let version = if !daily.updated_at.is_empty() {
        daily.updated_at.as_str()
    } else {
        daily.date.as_str()
    };
    if version.is_empty() {
        return WEEKLY_FILE.to_string();
    }
    format!("{WEEKLY_FILE}?v={}", percent_encode(version))
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub async fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(value).map_err(AppError::internal)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(AppError::internal)?;
    }
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

/// Loader backed by the snapshot dir. The query string is a cache key only;
/// it is stripped before touching the filesystem.
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ResourceLoader for FileLoader {
    async fn load(&self, url: &str) -> Result<serde_json::Value, LoadError> {
        let path = url.split('?').next().unwrap_or(url);
        if path.contains("..") || path.starts_with('/') {
            return Err(LoadError::new(url, "path escapes snapshot dir"));
        }
        let full = self.root.join(path);
        let bytes = fs::read(&full)
            .await
            .map_err(|err| LoadError::new(url, err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| LoadError::new(url, err.to_string()))
    }
}
