// Headless browser sessions for captures that only render their ranking
// after scripts run. Sessions are launched lazily by `FetchContext` and
// closed when the run ends.

use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, InterceptRequest, Intercepted};
use tracing::info;

use crate::error::Result;

/// Starts a browser session. Called at most once per run.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A live browser. One navigation at a time.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url` and wait up to `deadline` for a network response
    /// whose URL contains every marker. Responses with a status listed in
    /// `ignore_status` do not count.
    async fn intercept(
        &mut self,
        url: &str,
        markers: &[&str],
        ignore_status: &[u16],
        deadline: Duration,
    ) -> Result<Intercepted>;

    async fn close(self: Box<Self>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Browserless
// ---------------------------------------------------------------------------

pub struct BrowserlessLauncher {
    base_url: String,
    token: Option<String>,
}

impl BrowserlessLauncher {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: token.map(String::from),
        }
    }
}

#[async_trait]
impl BrowserLauncher for BrowserlessLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let client = BrowserlessClient::new(&self.base_url, self.token.as_deref())?;
        let version = client.version().await?;
        info!(base_url = self.base_url.as_str(), version = version.as_str(), "Browser session opened");
        Ok(Box::new(BrowserlessSession { client }))
    }
}

struct BrowserlessSession {
    client: BrowserlessClient,
}

#[async_trait]
impl BrowserSession for BrowserlessSession {
    async fn intercept(
        &mut self,
        url: &str,
        markers: &[&str],
        ignore_status: &[u16],
        deadline: Duration,
    ) -> Result<Intercepted> {
        let req = InterceptRequest {
            url,
            markers,
            ignore_status,
            deadline,
        };
        Ok(self.client.intercept(&req).await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        info!("Browser session closed");
        Ok(())
    }
}
