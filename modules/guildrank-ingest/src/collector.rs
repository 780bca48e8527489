// Merges extracted rankings into the dataset. Shared by the archive run and
// the local directory replay: empty rankings and repeats of the last emitted
// ranking are dropped, everything else is recorded and checkpointed.

use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info};

use guildrank_common::{ranking_ids, Dataset, RankingEntry};

use crate::output::OutputWriter;
use crate::summary::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Emitted,
    Empty,
    Duplicate,
}

pub struct Collector {
    dataset: Dataset,
    last_emitted: Option<Vec<String>>,
    writer: OutputWriter,
    summary: RunSummary,
}

impl Collector {
    pub fn new(dataset_name: &str, writer: OutputWriter) -> Self {
        Self {
            dataset: Dataset::new(dataset_name),
            last_emitted: None,
            writer,
            summary: RunSummary::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn summary_mut(&mut self) -> &mut RunSummary {
        &mut self.summary
    }

    /// Record `entries` unless they are empty or identical (same ids, same
    /// order) to the last ranking emitted. An emitted record is checkpointed
    /// immediately.
    pub async fn offer(&mut self, timestamp: u64, entries: &[RankingEntry]) -> Result<Offer> {
        if entries.is_empty() {
            debug!(timestamp, "No ranking in capture");
            self.summary.skipped_empty += 1;
            return Ok(Offer::Empty);
        }

        // Compare what would be written: repeats inside one ranking collapse.
        let mut seen = HashSet::new();
        let mut ids = ranking_ids(entries);
        ids.retain(|id| seen.insert(id.clone()));
        if self.last_emitted.as_ref() == Some(&ids) {
            debug!(timestamp, "Ranking unchanged since last record");
            self.summary.skipped_duplicate += 1;
            return Ok(Offer::Duplicate);
        }

        let record = self.dataset.record(timestamp, entries);
        info!(timestamp, titles = record.product_ids.len(), "Ranking recorded");
        self.last_emitted = Some(record.product_ids.clone());
        self.summary.emitted += 1;

        self.writer.checkpoint(&self.dataset).await?;
        Ok(Offer::Emitted)
    }

    /// Final compact write. Returns the dataset and the run's counts.
    pub async fn finish(self) -> Result<(Dataset, RunSummary)> {
        self.writer.finish(&self.dataset).await?;
        info!(
            path = %self.writer.path().display(),
            rankings = self.dataset.rankings.len(),
            titles = self.dataset.titles.len(),
            "Dataset written"
        );
        Ok((self.dataset, self.summary))
    }
}
