// Offline ingestion from a directory of hand-saved snapshots. Each file is
// one capture; its date comes from the file name.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, error, info};

use guildrank_archive::{RankingExtractor, StaticMarkupExtractor, StructuredApiExtractor};
use guildrank_common::Dataset;

use crate::collector::Collector;
use crate::output::OutputWriter;
use crate::summary::RunSummary;

/// Capture timestamp for a snapshot named `YYYY-MM...`: the 15th of that
/// month at midnight. `None` when the name does not start with a valid
/// year and month.
pub fn timestamp_from_file_name(name: &str) -> Option<u64> {
    let prefix = name.get(..7)?;
    let (year, month) = prefix.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 15)?;
    date.format("%Y%m%d000000").to_string().parse().ok()
}

fn extractor_for(name: &str) -> &'static dyn RankingExtractor {
    if name.ends_with(".json") {
        &StructuredApiExtractor
    } else {
        &StaticMarkupExtractor
    }
}

/// Ingest every snapshot in `dir`, in file-name order. A file that fails to
/// read or parse is logged and skipped.
pub async fn replay_dir(
    dir: &Path,
    dataset_name: &str,
    output: OutputWriter,
) -> Result<(Dataset, RunSummary)> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read snapshot directory {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    info!(dir = %dir.display(), files = names.len(), "Replaying local snapshots");

    let mut collector = Collector::new(dataset_name, output);

    for name in &names {
        let Some(timestamp) = timestamp_from_file_name(name) else {
            debug!(file = name.as_str(), "Skipping file without a YYYY-MM name");
            continue;
        };
        collector.summary_mut().captures_seen += 1;

        let content = match tokio::fs::read_to_string(dir.join(name)).await {
            Ok(content) => content,
            Err(e) => {
                error!(file = name.as_str(), error = %e, "Failed to read snapshot");
                collector.summary_mut().failed += 1;
                continue;
            }
        };
        let entries = match extractor_for(name).extract(&content) {
            Ok(entries) => entries,
            Err(e) => {
                error!(file = name.as_str(), timestamp, error = %e, "Failed to extract ranking");
                collector.summary_mut().failed += 1;
                continue;
            }
        };

        collector.offer(timestamp, &entries).await?;
    }

    let (dataset, summary) = collector.finish().await?;
    info!("Replay complete. {summary}");
    Ok((dataset, summary))
}
