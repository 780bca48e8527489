use tracing::info;

use wayback_client::{index_url, parse_index, CaptureDescriptor};

use crate::context::FetchContext;
use crate::error::Result;
use crate::store::CacheKey;

/// Cache label of the capture index. Fixed, so the index is fetched once per
/// cache directory and later runs reuse it.
pub const INDEX_CACHE_LABEL: &str = "snapshotsList";

/// Every capture of `site` the archive knows about, in index order.
pub async fn list_captures(
    ctx: &mut FetchContext,
    archive_root: &str,
    site: &str,
) -> Result<Vec<CaptureDescriptor>> {
    let url = index_url(archive_root, site);
    let body = ctx.fetch(&CacheKey::label(INDEX_CACHE_LABEL), &url).await?;
    let captures = parse_index(&body);
    info!(site, count = captures.len(), "Capture index loaded");
    Ok(captures)
}
