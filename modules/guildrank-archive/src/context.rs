// Run-scoped fetch state: the cache, the rate limiter, the HTTP source and
// the lazily launched browser. One per run, passed by `&mut` to everything
// that touches the network.

use std::sync::Arc;
use std::time::Duration;

use browserless_client::Intercepted;
use tracing::{info, warn};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::error::Result;
use crate::fetchers::CaptureSource;
use crate::store::{CacheKey, FetchCache};
use crate::throttle::RateLimiter;

pub struct FetchContext {
    cache: FetchCache,
    limiter: RateLimiter,
    source: Arc<dyn CaptureSource>,
    launcher: Arc<dyn BrowserLauncher>,
    browser: Option<Box<dyn BrowserSession>>,
}

impl FetchContext {
    pub fn new(
        cache: FetchCache,
        limiter: RateLimiter,
        source: Arc<dyn CaptureSource>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            cache,
            limiter,
            source,
            launcher,
            browser: None,
        }
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn browser_open(&self) -> bool {
        self.browser.is_some()
    }

    /// Cached, throttled GET.
    pub async fn fetch(&mut self, key: &CacheKey, url: &str) -> Result<String> {
        let source = self.source.clone();
        self.cache
            .get_or_fetch(key, &mut self.limiter, || async move { source.get_text(url).await })
            .await
    }

    /// Cached, throttled browser navigation that keeps the body of the first
    /// response matching `markers`. A deadline with no match is stored as an
    /// empty entry so the capture is not navigated again on later runs.
    pub async fn fetch_rendered(
        &mut self,
        key: &CacheKey,
        url: &str,
        markers: &[&str],
        ignore_status: &[u16],
        deadline: Duration,
    ) -> Result<String> {
        let Self {
            cache,
            limiter,
            launcher,
            browser,
            ..
        } = self;

        cache
            .get_or_fetch(key, limiter, || async move {
                let session = match *browser {
                    Some(ref mut session) => session,
                    None => browser.insert(launcher.launch().await?),
                };
                match session.intercept(url, markers, ignore_status, deadline).await? {
                    Intercepted::Response {
                        url: polled,
                        status,
                        body,
                    } => {
                        info!(url = polled.as_str(), status, "Actual URL being polled");
                        Ok(body)
                    }
                    Intercepted::TimedOut => {
                        warn!(
                            url,
                            deadline_secs = deadline.as_secs(),
                            "No matching response before deadline"
                        );
                        Ok(String::new())
                    }
                }
            })
            .await
    }

    /// Close the browser if one was launched. Safe to call more than once.
    pub async fn release(&mut self) -> Result<()> {
        match self.browser.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}
