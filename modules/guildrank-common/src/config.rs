use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

/// How captures are mapped to endpoints and extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverMode {
    /// Pick the strategy from the capture's year.
    Era,
    /// Walk an ordered endpoint list, advancing whenever one comes back empty.
    Fallback,
}

impl ResolverMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "era" => Some(Self::Era),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }
}

/// Run configuration loaded from environment variables. Every field has a
/// default so a bare run works without any environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub site_url: String,
    pub dataset_name: String,
    pub archive_root: String,
    pub cache_dir: PathBuf,
    pub output_path: PathBuf,
    pub throttle: Duration,
    pub resolver: ResolverMode,
    pub browserless_url: String,
    pub browserless_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: "www.dmsguild.com".to_string(),
            dataset_name: "DMsGuild".to_string(),
            archive_root: "https://web.archive.org".to_string(),
            cache_dir: PathBuf::from("tmp"),
            output_path: PathBuf::from("dmsguild.json"),
            throttle: Duration::from_millis(5000),
            resolver: ResolverMode::Era,
            browserless_url: "http://localhost:3000".to_string(),
            browserless_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            site_url: env_or("GUILDRANK_SITE_URL", defaults.site_url),
            dataset_name: env_or("GUILDRANK_DATASET_NAME", defaults.dataset_name),
            archive_root: env_or("GUILDRANK_ARCHIVE_ROOT", defaults.archive_root),
            cache_dir: env::var("GUILDRANK_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            output_path: env::var("GUILDRANK_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            throttle: env::var("GUILDRANK_THROTTLE_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.throttle),
            resolver: env::var("GUILDRANK_RESOLVER")
                .ok()
                .and_then(|v| ResolverMode::parse(&v))
                .unwrap_or(defaults.resolver),
            browserless_url: env_or("BROWSERLESS_URL", defaults.browserless_url),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        let token = if self.browserless_token.is_some() { "***" } else { "(none)" };
        info!(
            site_url = self.site_url.as_str(),
            dataset = self.dataset_name.as_str(),
            archive_root = self.archive_root.as_str(),
            cache_dir = %self.cache_dir.display(),
            output = %self.output_path.display(),
            throttle_ms = self.throttle.as_millis() as u64,
            resolver = ?self.resolver,
            browserless_url = self.browserless_url.as_str(),
            browserless_token = token,
            "Configuration loaded"
        );
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}
