use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use guildrank_common::Dataset;

/// Writes the dataset file. Checkpoints are pretty-printed so a partial run
/// can be inspected by hand; the final write is compact. Every write goes
/// through a sibling temp file so readers never see half a document.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    path: PathBuf,
}

impl OutputWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn checkpoint(&self, dataset: &Dataset) -> Result<()> {
        let json = dataset
            .to_pretty_json()
            .context("Failed to serialize dataset checkpoint")?;
        self.write(&json).await?;
        debug!(path = %self.path.display(), rankings = dataset.rankings.len(), "Checkpoint written");
        Ok(())
    }

    pub async fn finish(&self, dataset: &Dataset) -> Result<()> {
        let json = dataset
            .to_compact_json()
            .context("Failed to serialize dataset")?;
        self.write(&json).await
    }

    async fn write(&self, json: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
