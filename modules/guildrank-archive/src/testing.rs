// Test doubles for the two network seams:
// - MockCaptureSource (CaptureSource): URL→body map, records every GET
// - MockBrowser (BrowserLauncher + BrowserSession): URL→render outcome,
//   counts launches, navigations and closes
//
// No network, no browser. Shared state sits behind Arc so a clone kept by
// the test observes what the pipeline did with the original.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessError, Intercepted};
use wayback_client::WaybackError;

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::error::{ArchiveError, Result};
use crate::fetchers::CaptureSource;

// ---------------------------------------------------------------------------
// MockCaptureSource
// ---------------------------------------------------------------------------

/// Canned bodies by URL. Unregistered URLs answer like a missing capture
/// (HTTP 404).
#[derive(Default)]
pub struct MockCaptureSource {
    bodies: HashMap<String, String>,
    failures: HashMap<String, u16>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCaptureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    /// Handle on the list of URLs requested so far.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl CaptureSource for MockCaptureSource {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(url.to_string());

        if let Some(status) = self.failures.get(url) {
            return Err(WaybackError::Api {
                status: *status,
                message: format!("MockCaptureSource: forced failure for {url}"),
            }
            .into());
        }
        self.bodies.get(url).cloned().ok_or_else(|| {
            WaybackError::Api {
                status: 404,
                message: format!("MockCaptureSource: nothing registered for {url}"),
            }
            .into()
        })
    }
}

// ---------------------------------------------------------------------------
// MockBrowser
// ---------------------------------------------------------------------------

/// What a navigation to a registered URL produces.
#[derive(Debug, Clone)]
pub enum MockRender {
    Body(String),
    TimedOut,
    Undecodable,
}

#[derive(Default)]
struct BrowserLog {
    launches: AtomicUsize,
    closes: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

/// Launcher and session in one. Unregistered URLs time out.
#[derive(Clone, Default)]
pub struct MockBrowser {
    renders: Arc<HashMap<String, MockRender>>,
    log: Arc<BrowserLog>,
    fail_launch: bool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, url: &str, render: MockRender) -> Self {
        Arc::make_mut(&mut self.renders).insert(url.to_string(), render);
        self
    }

    /// Make `launch` fail, as when the browser service is down.
    pub fn unavailable(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn launches(&self) -> usize {
        self.log.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.log.closes.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log
            .navigations
            .lock()
            .expect("navigations lock poisoned")
            .clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(ArchiveError::Browser(BrowserlessError::Network(
                "MockBrowser: unavailable".into(),
            )));
        }
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl BrowserSession for MockBrowser {
    async fn intercept(
        &mut self,
        url: &str,
        markers: &[&str],
        _ignore_status: &[u16],
        _deadline: Duration,
    ) -> Result<Intercepted> {
        self.log
            .navigations
            .lock()
            .expect("navigations lock poisoned")
            .push(url.to_string());

        match self.renders.get(url) {
            Some(MockRender::Body(body)) => Ok(Intercepted::Response {
                url: format!("{url}/api/{}", markers.join("/")),
                status: 200,
                body: body.clone(),
            }),
            Some(MockRender::Undecodable) => Err(ArchiveError::Browser(
                BrowserlessError::UndecodableBody {
                    url: url.to_string(),
                },
            )),
            Some(MockRender::TimedOut) | None => Ok(Intercepted::TimedOut),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
