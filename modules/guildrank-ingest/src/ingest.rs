use anyhow::{Context, Result};
use tracing::{error, info, warn};

use guildrank_archive::{list_captures, FetchContext, SnapshotResolver};
use guildrank_common::Dataset;

use crate::collector::Collector;
use crate::output::OutputWriter;
use crate::summary::RunSummary;

/// What to ingest and where to put it.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub archive_root: String,
    pub site_url: String,
    pub dataset_name: String,
    pub output: OutputWriter,
}

/// Walk every capture of the site, resolve its ranking and build the
/// dataset, checkpointing after each new record.
///
/// Only a failed index fetch or an unwritable output aborts the run; a
/// capture that fails to resolve is logged and skipped. The browser session
/// is released on every exit path.
pub async fn run(
    ctx: &mut FetchContext,
    resolver: &mut dyn SnapshotResolver,
    settings: RunSettings,
) -> Result<(Dataset, RunSummary)> {
    let outcome = ingest_captures(ctx, resolver, settings).await;

    if let Err(e) = ctx.release().await {
        warn!(error = %e, "Failed to release browser session");
    }

    if let Ok((_, summary)) = &outcome {
        info!("Ingestion complete. {summary}");
    }
    outcome
}

async fn ingest_captures(
    ctx: &mut FetchContext,
    resolver: &mut dyn SnapshotResolver,
    settings: RunSettings,
) -> Result<(Dataset, RunSummary)> {
    let captures = list_captures(ctx, &settings.archive_root, &settings.site_url)
        .await
        .context("Failed to retrieve capture index")?;

    let mut collector = Collector::new(&settings.dataset_name, settings.output);

    for capture in &captures {
        collector.summary_mut().captures_seen += 1;

        if !capture.is_ok() {
            info!(
                timestamp = capture.timestamp,
                status = capture.http_status.as_str(),
                "Skipping capture with non-200 status"
            );
            collector.summary_mut().skipped_status += 1;
            continue;
        }

        let entries = match resolver.resolve(ctx, capture.timestamp).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(timestamp = capture.timestamp, error = %e, "Failed to resolve capture");
                collector.summary_mut().failed += 1;
                continue;
            }
        };

        collector.offer(capture.timestamp, &entries).await?;
    }

    collector.finish().await
}
