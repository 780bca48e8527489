// Capture → ranking. Decides where a capture's ranking lives (homepage,
// listing API) and which extractor reads it.

use std::time::Duration;

use async_trait::async_trait;
use browserless_client::BrowserlessError;
use tracing::{debug, info, warn};

use guildrank_common::RankingEntry;
use wayback_client::{capture_url, timestamp_year};

use crate::context::FetchContext;
use crate::error::{ArchiveError, Result};
use crate::extract::{extract_feed_body, RankingExtractor, StaticMarkupExtractor, StructuredApiExtractor};
use crate::store::CacheKey;

/// Captures before this year never carry a usable ranking.
pub const FIRST_USABLE_YEAR: u32 = 2016;
/// From this year on the listing API is archived directly.
pub const LISTING_API_YEAR: u32 = 2021;

/// Tokens identifying the "hottest products" feed request.
pub const FEED_MARKERS: &[&str] = &["hottest", "45469"];
/// Redirects of the feed request are not the feed.
const IGNORED_FEED_STATUS: &[u16] = &[302];
/// How long a rendered capture gets to issue the feed request.
pub const RENDER_DEADLINE: Duration = Duration::from_secs(20);

const HOMEPAGE: &str = "http://www.dmsguild.com/";
const SECURE_HOMEPAGE: &str = "https://www.dmsguild.com/";
const LEGACY_FEED: &str = "http://www.dmsguild.com/api/products/list/hottest_filtered?filters=45469&include_community_content=1&strip_src=hottest_in_dmg";
const SLIDER_FEED: &str = "https://www.dmsguild.com/api/products/list/hottest_filtered/slider_view?filters=45469&include_community_content=1&strip_src=hottest_in_dmg";

const TIMESTAMP_SLOT: &str = "{timestamp}";

#[async_trait]
pub trait SnapshotResolver: Send {
    /// Ranking shown by the capture taken at `timestamp`. Empty when the
    /// capture has none.
    async fn resolve(&mut self, ctx: &mut FetchContext, timestamp: u64) -> Result<Vec<RankingEntry>>;
}

// ---------------------------------------------------------------------------
// Era selection
// ---------------------------------------------------------------------------

/// Where a capture's ranking is read from, decided once per capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Too old to hold a usable ranking.
    Skip,
    /// Load the homepage capture in a browser and intercept the feed request.
    RenderedHomepage { url: String },
    /// Fetch the archived listing API response and parse it as JSON.
    ListingApi { url: String },
}

impl Strategy {
    pub fn for_capture(archive_root: &str, timestamp: u64) -> Self {
        let year = timestamp_year(timestamp);
        if year < FIRST_USABLE_YEAR {
            Strategy::Skip
        } else if year < LISTING_API_YEAR {
            Strategy::RenderedHomepage {
                url: capture_url(archive_root, timestamp, HOMEPAGE, false),
            }
        } else {
            Strategy::ListingApi {
                url: capture_url(archive_root, timestamp, SLIDER_FEED, true),
            }
        }
    }
}

/// Picks the strategy from the capture year. Cache entries are labelled with
/// the capture timestamp.
pub struct EraResolver {
    archive_root: String,
}

impl EraResolver {
    pub fn new(archive_root: &str) -> Self {
        Self {
            archive_root: archive_root.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SnapshotResolver for EraResolver {
    async fn resolve(&mut self, ctx: &mut FetchContext, timestamp: u64) -> Result<Vec<RankingEntry>> {
        let key = CacheKey::label(&timestamp.to_string());

        match Strategy::for_capture(&self.archive_root, timestamp) {
            Strategy::Skip => {
                debug!(timestamp, "Capture predates usable rankings");
                Ok(Vec::new())
            }
            Strategy::RenderedHomepage { url } => {
                let body = match ctx
                    .fetch_rendered(&key, &url, FEED_MARKERS, IGNORED_FEED_STATUS, RENDER_DEADLINE)
                    .await
                {
                    Ok(body) => body,
                    Err(ArchiveError::Browser(BrowserlessError::UndecodableBody { url })) => {
                        warn!(timestamp, url = url.as_str(), "Feed response body unreadable");
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(e),
                };
                if body.trim().is_empty() {
                    return Ok(Vec::new());
                }
                extract_feed_body(&body)
            }
            Strategy::ListingApi { url } => {
                let body = ctx.fetch(&key, &url).await?;
                StructuredApiExtractor.extract(&body)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint fallback
// ---------------------------------------------------------------------------

/// Tries an ordered list of capture URL templates, oldest layout first.
/// When a template yields nothing the cursor moves on for good: layouts
/// follow each other in time, so a later capture never needs an earlier one.
pub struct FallbackResolver {
    endpoints: Vec<String>,
    cursor: usize,
}

impl FallbackResolver {
    /// The homepage, the legacy listing API, then the slider-view listing API.
    pub fn new(archive_root: &str) -> Self {
        let root = archive_root.trim_end_matches('/');
        Self::with_endpoints(
            [SECURE_HOMEPAGE, LEGACY_FEED, SLIDER_FEED]
                .iter()
                .map(|original| format!("{root}/web/{TIMESTAMP_SLOT}id_/{original}"))
                .collect(),
        )
    }

    /// Templates must contain `{timestamp}`.
    pub fn with_endpoints(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_endpoint(&self) -> Option<&str> {
        self.endpoints.get(self.cursor).map(String::as_str)
    }
}

#[async_trait]
impl SnapshotResolver for FallbackResolver {
    async fn resolve(&mut self, ctx: &mut FetchContext, timestamp: u64) -> Result<Vec<RankingEntry>> {
        while let Some(template) = self.endpoints.get(self.cursor) {
            let url = template.replace(TIMESTAMP_SLOT, &timestamp.to_string());
            let body = ctx.fetch(&CacheKey::for_url(&url), &url).await?;
            let entries = StaticMarkupExtractor.extract(&body)?;
            if !entries.is_empty() {
                return Ok(entries);
            }

            self.cursor += 1;
            info!(
                timestamp,
                cursor = self.cursor,
                next = self.current_endpoint().unwrap_or("(none)"),
                "Endpoint yielded no ranking, moving on"
            );
        }
        Ok(Vec::new())
    }
}
