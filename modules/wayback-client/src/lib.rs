pub mod error;
pub mod types;

pub use error::{Result, WaybackError};
pub use types::{parse_index, timestamp_year, CaptureDescriptor};

use std::time::Duration;

pub const DEFAULT_ARCHIVE_ROOT: &str = "https://web.archive.org";

/// Thin client over the Wayback Machine's CDX index and capture endpoints.
/// Knows how to build URLs and pull raw bodies; caching and pacing live in
/// the caller.
pub struct WaybackClient {
    client: reqwest::Client,
    root: String,
}

impl WaybackClient {
    pub fn new(root: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("guildrank/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            root: root.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// CDX index URL listing every capture of `site`.
    pub fn index_url(&self, site: &str) -> String {
        index_url(&self.root, site)
    }

    /// URL of a single capture. `raw` adds the `id_` qualifier so the archive
    /// serves the original bytes without its toolbar or link rewriting.
    pub fn capture_url(&self, timestamp: u64, original: &str, raw: bool) -> String {
        capture_url(&self.root, timestamp, original, raw)
    }

    /// GET a URL and return the body as text. Non-success statuses are errors
    /// so they never end up in the fetch cache.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WaybackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

pub fn index_url(root: &str, site: &str) -> String {
    format!("{}/cdx/search/cdx?url={}", root.trim_end_matches('/'), site)
}

pub fn capture_url(root: &str, timestamp: u64, original: &str, raw: bool) -> String {
    let qualifier = if raw { "id_" } else { "" };
    format!(
        "{}/web/{}{}/{}",
        root.trim_end_matches('/'),
        timestamp,
        qualifier,
        original
    )
}
