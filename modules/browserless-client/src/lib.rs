pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Deserialize;

/// Extra time allowed on top of the intercept deadline for navigation and
/// the round trip to Browserless itself.
const NAVIGATION_SLACK: Duration = Duration::from_secs(40);

/// Puppeteer function run inside Browserless. Navigates to `context.url` and
/// resolves with the first response whose URL contains every marker and whose
/// status is not in `ignoreStatus`, or `null` once `deadlineMs` passes.
const INTERCEPT_FN: &str = r#"
export default async function ({ page, context }) {
  const { url, markers, ignoreStatus, deadlineMs } = context;
  let settle;
  const matched = new Promise((resolve) => { settle = resolve; });
  const onResponse = async (response) => {
    const target = response.url();
    if (!markers.every((marker) => target.includes(marker))) return;
    const status = response.status();
    if (ignoreStatus.includes(status)) return;
    page.off("response", onResponse);
    let body = null;
    try { body = await response.text(); } catch (e) { body = null; }
    settle({ url: target, status, body });
  };
  page.on("response", onResponse);
  await page.goto(url, { waitUntil: "domcontentloaded" });
  const timer = new Promise((resolve) => setTimeout(() => resolve(null), deadlineMs));
  const data = await Promise.race([matched, timer]);
  page.off("response", onResponse);
  return { data, type: "application/json" };
}
"#;

/// What to listen for while a page loads.
#[derive(Debug, Clone)]
pub struct InterceptRequest<'a> {
    pub url: &'a str,
    /// Every marker must appear in a response URL for it to match.
    pub markers: &'a [&'a str],
    /// Matching responses with these statuses are skipped (e.g. 302).
    pub ignore_status: &'a [u16],
    pub deadline: Duration,
}

/// Result of a navigate-and-listen call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercepted {
    Response {
        url: String,
        status: u16,
        body: String,
    },
    /// No matching response arrived before the deadline.
    TimedOut,
}

#[derive(Debug, Deserialize)]
struct InterceptPayload {
    url: String,
    status: u16,
    body: Option<String>,
}

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}{}", self.base_url, path);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// Browser version reported by the service. Doubles as a health check.
    pub async fn version(&self) -> Result<String> {
        let resp = self.client.get(self.endpoint("/json/version")).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let info: serde_json::Value = resp.json().await?;
        Ok(info
            .get("Browser")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string())
    }

    /// Load `req.url` in a headless page and return the body of the first
    /// network response matching `req.markers`, instead of the page's own DOM.
    pub async fn intercept(&self, req: &InterceptRequest<'_>) -> Result<Intercepted> {
        let body = serde_json::json!({
            "code": INTERCEPT_FN,
            "context": {
                "url": req.url,
                "markers": req.markers,
                "ignoreStatus": req.ignore_status,
                "deadlineMs": req.deadline.as_millis() as u64,
            },
        });

        let resp = self
            .client
            .post(self.endpoint("/function"))
            .header("Content-Type", "application/json")
            .timeout(req.deadline + NAVIGATION_SLACK)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        decode_intercept(&resp.text().await?)
    }
}

/// Decode the function's JSON result. `null` means the deadline passed.
pub fn decode_intercept(raw: &str) -> Result<Intercepted> {
    let payload: Option<InterceptPayload> = serde_json::from_str(raw)?;
    match payload {
        None => Ok(Intercepted::TimedOut),
        Some(InterceptPayload {
            url,
            status,
            body: Some(body),
        }) => {
            tracing::info!(url = url.as_str(), status, "Intercepted response");
            Ok(Intercepted::Response { url, status, body })
        }
        Some(InterceptPayload { url, body: None, .. }) => {
            Err(BrowserlessError::UndecodableBody { url })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_result_is_timeout() {
        assert_eq!(decode_intercept("null").unwrap(), Intercepted::TimedOut);
    }

    #[test]
    fn matched_response_carries_body() {
        let raw = r#"{"url":"https://x/api/hottest?filters=45469","status":200,"body":"<a>"}"#;
        match decode_intercept(raw).unwrap() {
            Intercepted::Response { url, status, body } => {
                assert!(url.contains("hottest"));
                assert_eq!(status, 200);
                assert_eq!(body, "<a>");
            }
            other => panic!("expected Response, got {:?}", other),
        }
    }

    #[test]
    fn missing_body_is_undecodable() {
        let raw = r#"{"url":"https://x/hottest","status":200,"body":null}"#;
        assert!(matches!(
            decode_intercept(raw),
            Err(BrowserlessError::UndecodableBody { .. })
        ));
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(
            decode_intercept("<html>"),
            Err(BrowserlessError::Parse(_))
        ));
    }

    #[test]
    fn token_is_appended_to_endpoint() {
        let client = BrowserlessClient::new("http://localhost:3000/", Some("abc")).unwrap();
        assert_eq!(
            client.endpoint("/function"),
            "http://localhost:3000/function?token=abc"
        );
        let anon = BrowserlessClient::new("http://localhost:3000", None).unwrap();
        assert_eq!(anon.endpoint("/json/version"), "http://localhost:3000/json/version");
    }
}
