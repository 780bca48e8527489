// On-disk fetch cache. One file per retrieval key under the cache dir.
// A present file is a hit, even when empty.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{ArchiveError, Result};
use crate::throttle::RateLimiter;

/// Name under which a fetched body is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Caller-chosen label such as a capture timestamp. Labels containing
    /// anything outside `[A-Za-z0-9_.-]` are hashed instead.
    pub fn label(label: &str) -> Self {
        let usable = !label.is_empty()
            && !label.starts_with('.')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if usable {
            Self(label.to_string())
        } else {
            Self::for_url(label)
        }
    }

    /// Hex SHA-256 of the URL.
    pub fn for_url(url: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(url.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct FetchCache {
    dir: PathBuf,
}

impl FetchCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.html", key.as_str()))
    }

    /// Stored body for `key`, or `None` if it was never fetched.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArchiveError::Cache {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Write `content` under `key`. Goes through a temp file and a rename so
    /// an interrupted write never leaves a truncated entry behind.
    pub async fn put(&self, key: &CacheKey, content: &str) -> Result<()> {
        let io_err = |source| ArchiveError::Cache {
            key: key.to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.html.part", key.as_str()));
        tokio::fs::write(&tmp, content.as_bytes()).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        Ok(())
    }

    /// Return the stored body for `key`, or wait for the limiter, run
    /// `fetch`, store whatever it returns (empty included) and return it.
    /// A failed fetch stores nothing, so the next call tries again.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &CacheKey,
        limiter: &mut RateLimiter,
        fetch: F,
    ) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(hit) = self.get(key).await? {
            debug!(key = key.as_str(), bytes = hit.len(), "Cache hit");
            return Ok(hit);
        }

        limiter.await_turn().await;
        let content = fetch().await?;
        self.put(key, &content).await?;
        info!(key = key.as_str(), bytes = content.len(), "Fetched and cached");
        Ok(content)
    }
}
