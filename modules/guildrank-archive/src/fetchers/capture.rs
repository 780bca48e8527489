// Plain HTTP retrieval of archive content.

use async_trait::async_trait;
use wayback_client::WaybackClient;

use crate::error::Result;

/// Anything that can GET a URL and hand back its body. The archive client in
/// production, a map of canned bodies in tests.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl CaptureSource for WaybackClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        Ok(WaybackClient::get_text(self, url).await?)
    }
}
