use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;

const ASSET_DIR: &str = "stream_assets";
const ASSET_EXT: &str = "mp3";

/// Turns an asset key (`resting_002`) into something the player can fetch.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, asset_key: &str) -> Result<String>;
}

/// Serves assets from a local media root as `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalMediaResolver {
    root: PathBuf,
}

impl LocalMediaResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn asset_path(&self, asset_key: &str) -> PathBuf {
        self.root
            .join(ASSET_DIR)
            .join(format!("{asset_key}.{ASSET_EXT}"))
    }
}

#[async_trait]
impl AssetResolver for LocalMediaResolver {
    async fn resolve(&self, asset_key: &str) -> Result<String> {
        let path = self.asset_path(asset_key);
        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if !exists {
            bail!("asset {asset_key} not found at {}", path.display());
        }
        Ok(file_url(&path))
    }
}

/// Builds time-limited URLs under a remote media prefix. Signing is left to
/// whatever sits in front of `base_url`; this only stamps the expiry.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    base_url: String,
    ttl: Duration,
}

impl BaseUrlResolver {
    pub fn new(base_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl,
        }
    }
}

#[async_trait]
impl AssetResolver for BaseUrlResolver {
    async fn resolve(&self, asset_key: &str) -> Result<String> {
        if self.base_url.is_empty() {
            bail!("no media base URL configured");
        }
        let expires = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| Utc::now().timestamp().checked_add(ttl));
        let Some(expires) = expires else {
            bail!("url ttl of {}s is out of range", self.ttl.as_secs());
        };
        Ok(format!(
            "{}/Media/{ASSET_DIR}/{asset_key}.{ASSET_EXT}?expires={expires}",
            self.base_url
        ))
    }
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Inverse of [`file_url`]; `None` for non-file URLs.
pub fn path_from_file_url(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}
