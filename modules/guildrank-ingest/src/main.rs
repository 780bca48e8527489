use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use guildrank_archive::{
    BrowserlessLauncher, EraResolver, FallbackResolver, FetchCache, FetchContext, RateLimiter,
    SnapshotResolver,
};
use guildrank_common::{Config, ResolverMode};
use guildrank_ingest::{run, OutputWriter, RunSettings};
use wayback_client::WaybackClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    guildrank_ingest::logging::init()?;

    info!("guildrank starting...");

    let config = Config::from_env();
    config.log_redacted();

    let wayback = WaybackClient::new(&config.archive_root)?;
    let launcher = BrowserlessLauncher::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    );
    let mut ctx = FetchContext::new(
        FetchCache::new(&config.cache_dir),
        RateLimiter::new(config.throttle),
        Arc::new(wayback),
        Arc::new(launcher),
    );

    let mut resolver: Box<dyn SnapshotResolver> = match config.resolver {
        ResolverMode::Era => Box::new(EraResolver::new(&config.archive_root)),
        ResolverMode::Fallback => Box::new(FallbackResolver::new(&config.archive_root)),
    };

    let settings = RunSettings {
        archive_root: config.archive_root.clone(),
        site_url: config.site_url.clone(),
        dataset_name: config.dataset_name.clone(),
        output: OutputWriter::new(&config.output_path),
    };

    run(&mut ctx, resolver.as_mut(), settings).await?;
    Ok(())
}
